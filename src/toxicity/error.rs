// Errors the classifier service reports to its callers.
//
// The serving layer needs to tell "we can't classify anything right now"
// apart from "this particular post can't be classified". Everything below the
// service boundary uses anyhow; this enum is the boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassifierError {
    /// Vocabulary or model could not be loaded. Classification-dependent
    /// operations should be refused until the artifacts are fixed.
    #[error("classification unavailable: {0}")]
    Unavailable(String),

    /// The post has no text to classify.
    #[error("invalid input: post text is empty")]
    EmptyInput,

    /// The model loaded but the forward pass failed.
    #[error("inference failed: {0}")]
    Inference(String),
}

impl ClassifierError {
    pub fn unavailable(err: &anyhow::Error) -> Self {
        ClassifierError::Unavailable(format!("{err:#}"))
    }

    pub fn inference(err: &anyhow::Error) -> Self {
        ClassifierError::Inference(format!("{err:#}"))
    }

    /// True when the condition is about the service, not the input.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ClassifierError::Unavailable(_))
    }
}
