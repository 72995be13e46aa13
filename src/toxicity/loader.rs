// Model loader — resolves the classifier from whatever artifacts are on disk.
//
// Candidates are tried in a fixed order and the first success wins:
//
//   1. full model     — ONNX graph at `full_model`, if the file exists
//   2. weights as full — the `weights` file opened as an ONNX graph (some
//                        exports carry the architecture alongside the weights)
//   3. reconstruction  — sniff shapes from `weights`, rebuild the fixed LSTM
//                        topology and fill it by tensor name
//
// The order is part of the contract: a full model always shadows a weights
// file sitting next to it. If every candidate fails, the error lists each
// attempt with its path and cause so an operator can tell which artifact is
// wrong.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use tracing::{info, warn};

use super::lstm::LstmClassifier;
use super::onnx::OnnxClassifier;
use super::traits::SequenceModel;
use super::weights::{infer_architecture, ArchitectureOverrides, WeightsInventory};
use crate::vocab::vocabulary::Vocabulary;

/// Which candidate produced the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ModelSource {
    FullModel,
    WeightsAsFullModel,
    Reconstructed,
}

impl ModelSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelSource::FullModel => "full model",
            ModelSource::WeightsAsFullModel => "weights file as full model",
            ModelSource::Reconstructed => "reconstructed from weights",
        }
    }
}

impl fmt::Display for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One failed candidate.
#[derive(Debug, Clone)]
pub struct LoadAttempt {
    pub source: ModelSource,
    pub path: PathBuf,
    pub error: String,
}

impl fmt::Display for LoadAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.source, self.path.display(), self.error)
    }
}

/// The model handle plus where it came from.
#[derive(Clone)]
pub struct LoadedModel {
    pub model: Arc<dyn SequenceModel>,
    pub source: ModelSource,
    pub path: PathBuf,
}

impl fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedModel")
            .field("model", &self.model.describe())
            .field("source", &self.source)
            .field("path", &self.path)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ModelLoader {
    pub full_model: PathBuf,
    pub weights: PathBuf,
    pub onnx_input: String,
    pub overrides: ArchitectureOverrides,
}

impl ModelLoader {
    /// Walk the candidates in order. `vocab` supplies the embedding row count
    /// for reconstruction and the sequence width for ONNX probing.
    pub fn load(&self, vocab: &Vocabulary) -> Result<LoadedModel> {
        let mut attempts: Vec<LoadAttempt> = Vec::new();
        let max_len = vocab.max_len();

        if self.full_model.exists() {
            match OnnxClassifier::load(&self.full_model, &self.onnx_input, max_len) {
                Ok(model) => return Ok(self.loaded(Arc::new(model), ModelSource::FullModel)),
                Err(e) => self.record(&mut attempts, ModelSource::FullModel, &self.full_model, e),
            }
        } else {
            self.record(
                &mut attempts,
                ModelSource::FullModel,
                &self.full_model,
                anyhow::anyhow!("file does not exist"),
            );
        }

        if self.weights.exists() {
            match OnnxClassifier::load(&self.weights, &self.onnx_input, max_len) {
                Ok(model) => {
                    return Ok(self.loaded(Arc::new(model), ModelSource::WeightsAsFullModel))
                }
                Err(e) => self.record(
                    &mut attempts,
                    ModelSource::WeightsAsFullModel,
                    &self.weights,
                    e,
                ),
            }

            match self.reconstruct(vocab) {
                Ok(model) => return Ok(self.loaded(Arc::new(model), ModelSource::Reconstructed)),
                Err(e) => self.record(&mut attempts, ModelSource::Reconstructed, &self.weights, e),
            }
        } else {
            for source in [ModelSource::WeightsAsFullModel, ModelSource::Reconstructed] {
                self.record(
                    &mut attempts,
                    source,
                    &self.weights,
                    anyhow::anyhow!("file does not exist"),
                );
            }
        }

        let listing: Vec<String> = attempts.iter().map(|a| format!("  - {a}")).collect();
        anyhow::bail!(
            "No classifier could be loaded; every candidate failed:\n{}",
            listing.join("\n")
        )
    }

    /// Candidate 3: infer the architecture from tensor shapes and rebuild it.
    pub fn reconstruct(&self, vocab: &Vocabulary) -> Result<LstmClassifier> {
        let inventory = WeightsInventory::from_file(&self.weights)?;
        let spec = infer_architecture(&inventory, vocab.len(), &self.overrides)?;
        info!(
            embedding_dim = spec.embedding_dim,
            output_units = spec.output_units,
            vocab_rows = spec.vocab_rows,
            "Inferred classifier architecture from weights"
        );
        LstmClassifier::from_weights(&self.weights, &inventory, spec)
    }

    fn loaded(&self, model: Arc<dyn SequenceModel>, source: ModelSource) -> LoadedModel {
        let path = match source {
            ModelSource::FullModel => self.full_model.clone(),
            ModelSource::WeightsAsFullModel | ModelSource::Reconstructed => self.weights.clone(),
        };
        info!(source = %source, model = %model.describe(), "Classifier ready");
        LoadedModel {
            model,
            source,
            path,
        }
    }

    fn record(
        &self,
        attempts: &mut Vec<LoadAttempt>,
        source: ModelSource,
        path: &Path,
        error: anyhow::Error,
    ) {
        warn!(source = %source, path = %path.display(), "Model candidate failed: {error:#}");
        attempts.push(LoadAttempt {
            source,
            path: path.to_path_buf(),
            error: format!("{error:#}"),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::vocabulary::VocabularyOptions;
    use std::collections::HashMap;

    fn vocab() -> Vocabulary {
        let map: HashMap<String, u32> = [("kill".to_string(), 1)].into_iter().collect();
        Vocabulary::from_map(map, VocabularyOptions::default()).unwrap()
    }

    #[test]
    fn test_no_artifacts_lists_every_attempt() {
        let dir = std::env::temp_dir().join("bullyscreen-test-nonexistent");
        let loader = ModelLoader {
            full_model: dir.join("classifier_full.onnx"),
            weights: dir.join("classifier.safetensors"),
            onnx_input: "input_1".to_string(),
            overrides: ArchitectureOverrides::default(),
        };

        let err = loader.load(&vocab()).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("classifier_full.onnx"), "{message}");
        assert!(message.contains("classifier.safetensors"), "{message}");
        assert!(message.contains("full model"));
        assert!(message.contains("reconstructed from weights"));
    }

    #[test]
    fn test_model_source_display() {
        assert_eq!(ModelSource::FullModel.to_string(), "full model");
        assert_eq!(
            ModelSource::Reconstructed.to_string(),
            "reconstructed from weights"
        );
    }
}
