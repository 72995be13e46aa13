// Classifier service — the one long-lived owner of vocabulary and model.
//
// The serving layer creates a single ClassifierService and shares it (behind
// an Arc) across request handlers. The first call to anything that needs the
// model triggers the load; concurrent first callers wait on the same
// initialization instead of loading twice. After that, reads are lock-free.
// A failed load is not cached, so fixing the artifacts and retrying works
// without a restart.
//
// Per post: clean → observe token count → encode → forward pass on a
// blocking thread → interpret against the author's standing.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::error::ClassifierError;
use super::loader::{LoadedModel, ModelLoader};
use super::neighbors::{nearest_words, Neighbor};
use super::traits::{ClassificationScore, ToxicityScorer};
use crate::config::Config;
use crate::scoring::reputation::{self, PostSource, ReputationUpdate, Standing, Visibility};
use crate::text::normalizer::{CleanedText, Normalizer};
use crate::vocab::encoder::{encode, EncodedBatch};
use crate::vocab::vocabulary::Vocabulary;

/// Vocabulary and model, loaded together.
pub struct Classifier {
    pub vocabulary: Arc<Vocabulary>,
    pub model: LoadedModel,
}

/// Full outcome of screening one post.
#[derive(Debug, Clone, Serialize)]
pub struct Screening {
    pub cleaned: String,
    pub score: ClassificationScore,
    pub update: ReputationUpdate,
    pub visibility: Visibility,
}

pub struct ClassifierService {
    config: Config,
    normalizer: Arc<Normalizer>,
    classifier: OnceCell<Arc<Classifier>>,
}

impl ClassifierService {
    pub fn new(config: Config) -> Self {
        Self::with_normalizer(config, Normalizer::english())
    }

    pub fn with_normalizer(config: Config, normalizer: Normalizer) -> Self {
        Self {
            config,
            normalizer: Arc::new(normalizer),
            classifier: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn is_loaded(&self) -> bool {
        self.classifier.initialized()
    }

    /// Load vocabulary and model if not already loaded.
    pub async fn load(&self) -> Result<Arc<Classifier>, ClassifierError> {
        self.classifier
            .get_or_try_init(|| async {
                let config = self.config.clone();
                tokio::task::spawn_blocking(move || load_classifier(&config))
                    .await
                    .context("spawn_blocking panicked")?
                    .map(Arc::new)
            })
            .await
            .cloned()
            .map_err(|e| ClassifierError::unavailable(&e))
    }

    /// Clean, encode and score a batch of raw texts.
    pub async fn predict(
        &self,
        texts: &[String],
    ) -> Result<Vec<ClassificationScore>, ClassifierError> {
        let cleaned: Vec<CleanedText> = texts.iter().map(|t| self.normalizer.clean(t)).collect();
        self.predict_cleaned(&cleaned).await
    }

    /// Encode and score texts that have already been through the normalizer.
    pub async fn predict_cleaned(
        &self,
        cleaned: &[CleanedText],
    ) -> Result<Vec<ClassificationScore>, ClassifierError> {
        let classifier = self.load().await?;
        if cleaned.is_empty() {
            return Ok(Vec::new());
        }

        let width = cleaned
            .iter()
            .map(|c| classifier.vocabulary.observe(c.token_count))
            .max()
            .unwrap_or_else(|| classifier.vocabulary.max_len());
        let texts: Vec<&str> = cleaned.iter().map(|c| c.text.as_str()).collect();
        let batch = encode(&texts, &classifier.vocabulary, width);

        run_batch(classifier, batch)
            .await
            .map_err(|e| ClassifierError::inference(&e))
    }

    /// Classify a post and apply the result to its author's standing.
    pub async fn screen_post(
        &self,
        text: &str,
        source: PostSource,
        standing: Standing,
    ) -> Result<Screening, ClassifierError> {
        if text.trim().is_empty() {
            return Err(ClassifierError::EmptyInput);
        }

        let cleaned = self.normalizer.clean(text);
        let score = self
            .predict_cleaned(std::slice::from_ref(&cleaned))
            .await?
            .pop()
            .ok_or_else(|| ClassifierError::Inference("model returned no rows".to_string()))?;

        let update = reputation::interpret(score.toxicity(), standing, source);
        let visibility = reputation::visibility(&update.standing);

        info!(
            toxicity = score.toxicity(),
            reward = update.delta_is_reward,
            total = update.standing.total,
            reputation_score = update.standing.reputation_score,
            visibility = %visibility,
            "Screened post"
        );

        Ok(Screening {
            cleaned: cleaned.text,
            score,
            update,
            visibility,
        })
    }

    /// Nearest vocabulary words to `word` in the model's embedding space.
    pub async fn nearest_words(
        &self,
        word: &str,
        k: usize,
    ) -> Result<Option<Vec<Neighbor>>, ClassifierError> {
        let classifier = self.load().await?;
        let table = classifier.model.model.embedding_table().ok_or_else(|| {
            ClassifierError::Inference(format!(
                "{} does not expose an embedding table",
                classifier.model.model.describe()
            ))
        })?;
        nearest_words(table, &classifier.vocabulary, word, k)
            .map_err(|e| ClassifierError::inference(&e))
    }
}

#[async_trait]
impl ToxicityScorer for ClassifierService {
    async fn score_text(&self, text: &str) -> Result<ClassificationScore> {
        self.score_batch(&[text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| anyhow::anyhow!("model returned no rows"))
    }

    async fn score_batch(&self, texts: &[String]) -> Result<Vec<ClassificationScore>> {
        Ok(self.predict(texts).await?)
    }
}

/// Synchronous load — vocabulary first, since reconstruction needs its size.
fn load_classifier(config: &Config) -> Result<Classifier> {
    let vocabulary = Vocabulary::load(&config.vocab_path, config.vocabulary_options())?;
    let loader = ModelLoader {
        full_model: config.full_model_path.clone(),
        weights: config.weights_path.clone(),
        onnx_input: config.onnx_input.clone(),
        overrides: config.overrides,
    };
    let model = loader.load(&vocabulary)?;
    Ok(Classifier {
        vocabulary: Arc::new(vocabulary),
        model,
    })
}

/// Run the forward pass on a blocking thread so the async runtime stays
/// responsive.
async fn run_batch(
    classifier: Arc<Classifier>,
    batch: EncodedBatch,
) -> Result<Vec<ClassificationScore>> {
    tokio::task::spawn_blocking(move || {
        let rows = batch.rows();
        let outputs = classifier.model.model.predict(&batch)?;
        if outputs.len() != rows {
            anyhow::bail!("model returned {} rows for a batch of {}", outputs.len(), rows);
        }
        debug!(rows, width = batch.width(), "Classified batch");
        Ok(outputs
            .into_iter()
            .map(|probabilities| ClassificationScore { probabilities })
            .collect())
    })
    .await
    .context("spawn_blocking panicked")?
}
