// Unit tests for the score interpreter.
//
// Tests the benign/bullying split at 0.4, both penalty bases, two-decimal
// rounding, the 0-10 reputation ratio, and visibility gating at 5.

use bullyscreen::scoring::reputation::{
    interpret, reputation_ratio, visibility, PostSource, ScoreError, Standing, Visibility,
};

fn standing(total: f64, reputation_score: f64) -> Standing {
    Standing {
        total,
        reputation_score,
    }
}

// ============================================================
// interpret — rewards and penalties
// ============================================================

#[test]
fn benign_score_rewards_both_accumulators() {
    let update = interpret(0.3, standing(10.0, 8.0), PostSource::Direct);
    assert!(update.delta_is_reward);
    assert!((update.delta - 0.1).abs() < 1e-9);
    assert_eq!(update.standing, standing(10.1, 8.1));
}

#[test]
fn cleaner_posts_earn_more() {
    let clean = interpret(0.05, standing(1.0, 1.0), PostSource::Direct);
    let borderline = interpret(0.35, standing(1.0, 1.0), PostSource::Direct);
    assert!(clean.delta > borderline.delta);
}

#[test]
fn bullying_score_only_moves_total() {
    let update = interpret(0.6, standing(10.0, 8.0), PostSource::Direct);
    assert!(!update.delta_is_reward);
    assert_eq!(update.standing, standing(10.2, 8.0));
}

#[test]
fn score_exactly_at_threshold_is_bullying() {
    let update = interpret(0.4, standing(5.0, 5.0), PostSource::Direct);
    assert!(!update.delta_is_reward);
    assert_eq!(update.standing, standing(5.0, 5.0));
}

#[test]
fn image_post_subtracts_higher_base() {
    let direct = interpret(0.9, standing(10.0, 8.0), PostSource::Direct);
    let image = interpret(0.9, standing(10.0, 8.0), PostSource::Image);
    assert_eq!(direct.standing.total, 10.5);
    assert_eq!(image.standing.total, 10.1);
}

#[test]
fn image_post_below_base_shrinks_total() {
    let update = interpret(0.6, standing(10.0, 8.0), PostSource::Image);
    assert!(update.delta < 0.0);
    assert_eq!(update.standing.total, 9.8);
}

#[test]
fn benign_image_post_is_rewarded_like_direct() {
    let direct = interpret(0.1, standing(2.0, 2.0), PostSource::Direct);
    let image = interpret(0.1, standing(2.0, 2.0), PostSource::Image);
    assert_eq!(direct, image);
}

#[test]
fn accumulators_are_rounded_to_two_decimals() {
    let update = interpret(0.123, standing(1.0, 1.0), PostSource::Direct);
    assert_eq!(update.standing, standing(1.28, 1.28));
}

// ============================================================
// Ratio and visibility
// ============================================================

#[test]
fn ratio_is_scaled_to_ten() {
    let ratio = reputation_ratio(&standing(8.0, 6.0)).unwrap();
    assert!((ratio - 7.5).abs() < 1e-9);
}

#[test]
fn ratio_exactly_five_is_visible() {
    assert_eq!(visibility(&standing(10.0, 5.0)), Visibility::Visible);
}

#[test]
fn ratio_below_five_is_blocked() {
    assert_eq!(visibility(&standing(10.0, 4.99)), Visibility::Blocked);
}

#[test]
fn zero_total_has_no_ratio() {
    assert_eq!(
        reputation_ratio(&standing(0.0, 0.0)),
        Err(ScoreError::UndefinedRatio { total: 0.0 })
    );
    assert_eq!(visibility(&standing(0.0, 0.0)), Visibility::Unrated);
}

#[test]
fn negative_or_nan_total_has_no_ratio() {
    assert!(reputation_ratio(&standing(-1.0, 0.5)).is_err());
    assert!(reputation_ratio(&standing(f64::NAN, 0.5)).is_err());
    assert_eq!(visibility(&standing(-1.0, 0.5)), Visibility::Unrated);
}
