// Classifier traits — the seams between loading, inference and serving.
//
// `SequenceModel` is what the loader produces: something that turns an
// encoded id matrix into per-row probabilities. Full ONNX models and
// reconstructed LSTMs both implement it, so the service doesn't care which
// artifact won.
//
// `ToxicityScorer` is the text-in, score-out interface the serving layer
// holds on to.

use anyhow::Result;
use async_trait::async_trait;
use candle_core::Tensor;
use serde::Serialize;

use crate::vocab::encoder::EncodedBatch;

/// Classifier output for one input text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationScore {
    /// One sigmoid unit, or a softmax distribution when the model has
    /// several output units.
    pub probabilities: Vec<f32>,
}

impl ClassificationScore {
    /// The toxicity scalar: the first output unit.
    pub fn toxicity(&self) -> f64 {
        self.probabilities.first().copied().unwrap_or(0.0) as f64
    }

    pub fn is_distribution(&self) -> bool {
        self.probabilities.len() > 1
    }
}

/// A loaded classifier. Implementations are read-only after construction
/// and safe to share across threads.
pub trait SequenceModel: Send + Sync {
    /// Forward pass. Returns one probability vector per batch row.
    fn predict(&self, batch: &EncodedBatch) -> Result<Vec<Vec<f32>>>;

    /// Number of output units.
    fn output_units(&self) -> usize;

    /// Short human-readable description for logs and `status`.
    fn describe(&self) -> String;

    /// The embedding table, when the model exposes one (`vocab rows × dim`).
    fn embedding_table(&self) -> Option<&Tensor> {
        None
    }
}

/// Trait for scoring post text. Async because inference runs on a blocking
/// thread and the first call may load artifacts.
#[async_trait]
pub trait ToxicityScorer: Send + Sync {
    /// Score a single text.
    async fn score_text(&self, text: &str) -> Result<ClassificationScore>;

    /// Score several texts in one forward pass. One result per text, in
    /// input order.
    async fn score_batch(&self, texts: &[String]) -> Result<Vec<ClassificationScore>>;
}
