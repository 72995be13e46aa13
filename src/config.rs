use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::toxicity::onnx::DEFAULT_INPUT_NAME;
use crate::toxicity::weights::ArchitectureOverrides;
use crate::vocab::vocabulary::{VocabularyOptions, DEFAULT_MAX_LEN};

/// File names looked up inside the artifact directory.
pub const VOCAB_FILE: &str = "word_to_index.json";
pub const FULL_MODEL_FILE: &str = "classifier_full.onnx";
pub const WEIGHTS_FILE: &str = "classifier.safetensors";

/// Central configuration loaded from environment variables.
///
/// Every artifact path can be set individually; unset paths resolve inside
/// `artifact_dir`. The .env file is loaded automatically at startup via
/// dotenvy.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the vocabulary and model artifacts
    pub artifact_dir: PathBuf,
    pub vocab_path: PathBuf,
    /// ONNX graph with architecture and weights (tried first)
    pub full_model_path: PathBuf,
    /// Weights artifact (tried as a full model, then reconstructed)
    pub weights_path: PathBuf,
    /// Sequence width for encoding (default 30)
    pub max_len: usize,
    /// Let max_len grow to the longest cleaned post seen (default off)
    pub adaptive_max_len: bool,
    /// Distinct id for out-of-vocabulary tokens (default: share id 0 with padding)
    pub unknown_id: Option<u32>,
    /// Pin sniffed dimensions when reconstructing from weights
    pub overrides: ArchitectureOverrides,
    /// Input name of the ONNX graph
    pub onnx_input: String,
}

impl Config {
    /// Load configuration from environment variables. Nothing is required;
    /// missing artifacts are reported when the classifier loads.
    pub fn load() -> Result<Self> {
        let artifact_dir = env::var("BULLYSCREEN_ARTIFACT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_artifact_dir());

        Ok(Self {
            vocab_path: path_var("BULLYSCREEN_VOCAB_PATH", &artifact_dir, VOCAB_FILE),
            full_model_path: path_var(
                "BULLYSCREEN_FULL_MODEL_PATH",
                &artifact_dir,
                FULL_MODEL_FILE,
            ),
            weights_path: path_var("BULLYSCREEN_WEIGHTS_PATH", &artifact_dir, WEIGHTS_FILE),
            max_len: parse_var("BULLYSCREEN_MAX_LEN")?.unwrap_or(DEFAULT_MAX_LEN),
            adaptive_max_len: parse_bool_var("BULLYSCREEN_ADAPTIVE_MAX_LEN")?,
            unknown_id: parse_var("BULLYSCREEN_UNKNOWN_ID")?,
            overrides: ArchitectureOverrides {
                embedding_dim: parse_var("BULLYSCREEN_EMBEDDING_DIM")?,
                output_units: parse_var("BULLYSCREEN_OUTPUT_UNITS")?,
            },
            onnx_input: env::var("BULLYSCREEN_ONNX_INPUT")
                .unwrap_or_else(|_| DEFAULT_INPUT_NAME.to_string()),
            artifact_dir,
        })
    }

    /// Configuration rooted at `dir` with defaults for everything else.
    pub fn with_artifact_dir(dir: &Path) -> Self {
        Self {
            artifact_dir: dir.to_path_buf(),
            vocab_path: dir.join(VOCAB_FILE),
            full_model_path: dir.join(FULL_MODEL_FILE),
            weights_path: dir.join(WEIGHTS_FILE),
            max_len: DEFAULT_MAX_LEN,
            adaptive_max_len: false,
            unknown_id: None,
            overrides: ArchitectureOverrides::default(),
            onnx_input: DEFAULT_INPUT_NAME.to_string(),
        }
    }

    pub fn vocabulary_options(&self) -> VocabularyOptions {
        VocabularyOptions {
            max_len: self.max_len,
            adaptive_max_len: self.adaptive_max_len,
            unknown_id: self.unknown_id,
        }
    }

    /// Check that the vocabulary and at least one model artifact exist.
    /// Call this before any operation that needs classification.
    pub fn require_artifacts(&self) -> Result<()> {
        if !self.vocab_path.exists() {
            anyhow::bail!(
                "Vocabulary not found at {}\n\
                 Set BULLYSCREEN_VOCAB_PATH or BULLYSCREEN_ARTIFACT_DIR.",
                self.vocab_path.display()
            );
        }
        if !self.full_model_path.exists() && !self.weights_path.exists() {
            anyhow::bail!(
                "No model artifact found. Looked for:\n  {}\n  {}\n\
                 Set BULLYSCREEN_FULL_MODEL_PATH or BULLYSCREEN_WEIGHTS_PATH.",
                self.full_model_path.display(),
                self.weights_path.display()
            );
        }
        Ok(())
    }
}

/// Returns the default directory for model artifacts.
/// Uses the platform data directory: ~/.local/share/bullyscreen/ on Linux.
pub fn default_artifact_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bullyscreen")
}

fn path_var(name: &str, dir: &Path, file: &str) -> PathBuf {
    env::var(name)
        .map(PathBuf::from)
        .unwrap_or_else(|_| dir.join(file))
}

fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("{name} has an invalid value: {raw:?}")),
        _ => Ok(None),
    }
}

fn parse_bool_var(name: &str) -> Result<bool> {
    match env::var(name).as_deref().map(str::trim) {
        Ok("1") | Ok("true") | Ok("yes") | Ok("on") => Ok(true),
        Ok("0") | Ok("false") | Ok("no") | Ok("off") | Ok("") | Err(_) => Ok(false),
        Ok(other) => anyhow::bail!("{name} must be true or false, got {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_artifact_dir_is_under_bullyscreen() {
        let dir = default_artifact_dir();
        assert!(dir.to_string_lossy().contains("bullyscreen"));
    }

    #[test]
    fn test_with_artifact_dir_resolves_files() {
        let dir = PathBuf::from("/tmp/bullyscreen-artifacts");
        let config = Config::with_artifact_dir(&dir);
        assert_eq!(config.vocab_path, dir.join(VOCAB_FILE));
        assert_eq!(config.full_model_path, dir.join(FULL_MODEL_FILE));
        assert_eq!(config.weights_path, dir.join(WEIGHTS_FILE));
        assert_eq!(config.max_len, DEFAULT_MAX_LEN);
        assert_eq!(config.vocabulary_options(), VocabularyOptions::default());
    }

    #[test]
    fn test_require_artifacts_reports_missing_vocab() {
        let dir = std::env::temp_dir().join("bullyscreen-test-nonexistent");
        let config = Config::with_artifact_dir(&dir);
        let err = config.require_artifacts().unwrap_err();
        assert!(err.to_string().contains("Vocabulary not found"));
    }
}
