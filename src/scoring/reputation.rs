// Reputation scoring — turns a toxicity score into account standing.
//
// Each user carries two running accumulators: `total` (grows with every post)
// and `reputation_score` (grows only with benign posts). Their ratio, scaled
// to 0-10, gates feed visibility: below 5 the account is blocked.
//
// Benign posts (score < 0.4) add `0.4 - score` to both, so confidently clean
// content earns more. Bullying posts add `score - penalty_base` to the total
// only, which drags the ratio down. The penalty base depends on where the
// text came from: 0.4 for typed or voice posts, 0.8 for text read out of an
// image. The two bases disagree (an image post scoring 0.6 *shrinks* the
// total), but both are kept as observed behavior rather than unified.
//
// Both accumulators are rounded to two decimals after every update, the way
// they are stored.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Scores below this are benign.
pub const BENIGN_THRESHOLD: f64 = 0.4;

/// Ratio (0-10 scale) below which an account is blocked.
pub const BLOCK_RATIO: f64 = 5.0;

/// Where the classified text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostSource {
    /// Typed or voice-transcribed post.
    Direct,
    /// Text extracted from an uploaded image.
    Image,
}

impl PostSource {
    /// Value subtracted from a bullying score before it is added to the total.
    pub fn penalty_base(self) -> f64 {
        match self {
            PostSource::Direct => 0.4,
            PostSource::Image => 0.8,
        }
    }
}

/// A user's running accumulators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub total: f64,
    pub reputation_score: f64,
}

/// Result of applying one classified post to a standing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReputationUpdate {
    pub standing: Standing,
    /// Amount added to the total (and, for rewards, to the reputation score).
    pub delta: f64,
    pub delta_is_reward: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ScoreError {
    #[error("reputation ratio is undefined for total {total}")]
    UndefinedRatio { total: f64 },
}

/// Feed visibility derived from the reputation ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Visibility {
    Visible,
    Blocked,
    /// No scored posts yet, so there is no ratio to judge.
    Unrated,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Visible => "Visible",
            Visibility::Blocked => "Blocked",
            Visibility::Unrated => "Unrated",
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Round to two decimals via string formatting, matching how the
/// accumulators are stored.
pub fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

/// Apply a toxicity score to a standing.
pub fn interpret(score: f64, current: Standing, source: PostSource) -> ReputationUpdate {
    if score < BENIGN_THRESHOLD {
        let delta = BENIGN_THRESHOLD - score;
        ReputationUpdate {
            standing: Standing {
                total: round2(current.total + delta),
                reputation_score: round2(current.reputation_score + delta),
            },
            delta,
            delta_is_reward: true,
        }
    } else {
        let delta = score - source.penalty_base();
        ReputationUpdate {
            standing: Standing {
                total: round2(current.total + delta),
                reputation_score: current.reputation_score,
            },
            delta,
            delta_is_reward: false,
        }
    }
}

/// `(reputation_score / total) * 10`. A non-positive or non-finite total has
/// no meaningful ratio and is reported as an error.
pub fn reputation_ratio(standing: &Standing) -> Result<f64, ScoreError> {
    if !standing.total.is_finite() || standing.total <= 0.0 {
        return Err(ScoreError::UndefinedRatio {
            total: standing.total,
        });
    }
    Ok((standing.reputation_score / standing.total) * 10.0)
}

pub fn visibility(standing: &Standing) -> Visibility {
    match reputation_ratio(standing) {
        Ok(ratio) if ratio < BLOCK_RATIO => Visibility::Blocked,
        Ok(_) => Visibility::Visible,
        Err(_) => Visibility::Unrated,
    }
}
