// Full-model artifacts run through ONNX Runtime.
//
// A full artifact carries both the architecture and the trained weights, so
// nothing needs to be inferred: the graph takes an `[batch, max_len]` int32
// id matrix and returns `[batch, units]` probabilities (the activation is
// part of the exported graph).

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use ort::session::Session;
use ort::value::Tensor;
use tracing::debug;

use super::traits::SequenceModel;
use crate::vocab::encoder::EncodedBatch;

/// Input name Keras exporters give the first model input.
pub const DEFAULT_INPUT_NAME: &str = "input_1";

pub struct OnnxClassifier {
    // ort::Session::run takes &mut self, so the session sits behind a Mutex.
    // Inference is serialized, which matches the one-forward-pass-per-request
    // model the service uses anyway.
    session: Mutex<Session>,
    input_name: String,
    path: PathBuf,
    output_units: usize,
}

impl OnnxClassifier {
    /// Load an ONNX graph. Fails if the file is missing or is not a valid
    /// model (a weights-only file, for instance). `max_len` is the width the
    /// graph was exported with; it is used for the warm-up run.
    pub fn load(path: &Path, input_name: &str, max_len: usize) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("Model file not found: {}", path.display());
        }

        let session = Session::builder()
            .context("Failed to create ONNX session builder")?
            .commit_from_file(path)
            .with_context(|| format!("Failed to load ONNX model from {}", path.display()))?;

        debug!("Loaded ONNX classifier from {}", path.display());

        let classifier = Self {
            session: Mutex::new(session),
            input_name: input_name.to_string(),
            path: path.to_path_buf(),
            output_units: 0,
        };
        classifier.warm_up(max_len)
    }

    /// Run a one-row all-padding batch to learn the output width and confirm
    /// the input name and dtype are accepted.
    fn warm_up(mut self, max_len: usize) -> Result<Self> {
        let blank = EncodedBatch::padding(1, max_len);
        let rows = self
            .run(&blank)
            .with_context(|| format!("Warm-up inference failed for {}", self.path.display()))?;
        self.output_units = rows.first().map(Vec::len).unwrap_or(0);
        if self.output_units == 0 {
            anyhow::bail!("{} produced an empty output", self.path.display());
        }
        Ok(self)
    }

    fn run(&self, batch: &EncodedBatch) -> Result<Vec<Vec<f32>>> {
        let shape = [batch.rows() as i64, batch.width() as i64];
        let flat: Vec<i32> = batch.lookup_ids().into_iter().map(|id| id as i32).collect();
        let input = Tensor::from_array((shape, flat)).context("Failed to create input tensor")?;

        let data = {
            let mut session = self
                .session
                .lock()
                .map_err(|e| anyhow::anyhow!("Session lock poisoned: {}", e))?;

            let outputs = session
                .run(ort::inputs! { self.input_name.as_str() => input })
                .context("ONNX inference failed")?;

            let (_out_shape, data) = outputs[0]
                .try_extract_tensor::<f32>()
                .context("Failed to extract output tensor")?;

            data.to_vec()
        };

        if batch.rows() == 0 || data.len() % batch.rows() != 0 {
            anyhow::bail!(
                "Output of {} values does not divide into {} rows",
                data.len(),
                batch.rows()
            );
        }
        let units = data.len() / batch.rows();
        Ok(data.chunks(units).map(<[f32]>::to_vec).collect())
    }
}

impl SequenceModel for OnnxClassifier {
    fn predict(&self, batch: &EncodedBatch) -> Result<Vec<Vec<f32>>> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }
        self.run(batch)
    }

    fn output_units(&self) -> usize {
        self.output_units
    }

    fn describe(&self) -> String {
        format!("ONNX graph {} ({} output units)", self.path.display(), self.output_units)
    }
}
