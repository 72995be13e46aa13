// Weights-only artifact inspection and architecture inference.
//
// A weights artifact holds trained tensors without any description of the
// network they belong to. To rebuild the classifier we sniff two numbers
// from the tensor shapes:
//
//   - embedding shape: the 2-D tensor with the most rows (vocab × dim)
//   - output units:    the widest second dimension among 2-D tensors whose
//                      name contains "dense"
//
// This is a heuristic. It holds for the embedding → LSTM → LSTM → dense
// classifier this crate reconstructs, where the embedding table dwarfs every
// other matrix, but nothing guarantees it for arbitrary files. Both values
// can be pinned with `ArchitectureOverrides` when sniffing picks wrong.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use safetensors::SafeTensors;
use serde::Serialize;
use tracing::debug;

/// Width of both recurrent layers.
pub const RECURRENT_UNITS: usize = 128;

/// Dropout rate between layers. Inference treats dropout as identity; the
/// rate is recorded so the reconstructed architecture is fully described.
pub const DROPOUT_RATE: f32 = 0.5;

/// Name and shape of one stored tensor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TensorInfo {
    pub name: String,
    pub shape: Vec<usize>,
}

/// Every tensor in a weights artifact, sorted by name.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WeightsInventory {
    pub tensors: Vec<TensorInfo>,
}

impl WeightsInventory {
    /// Read the tensor names and shapes from a safetensors file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)
            .with_context(|| format!("Failed to read weights file {}", path.display()))?;
        let tensors = SafeTensors::deserialize(&bytes)
            .with_context(|| format!("{} is not a safetensors file", path.display()))?;

        let inventory = Self::from_infos(tensors.tensors().into_iter().map(|(name, view)| {
            TensorInfo {
                name,
                shape: view.shape().to_vec(),
            }
        }));

        debug!(
            tensors = inventory.tensors.len(),
            path = %path.display(),
            "Inspected weights artifact"
        );
        Ok(inventory)
    }

    pub fn from_infos<I: IntoIterator<Item = TensorInfo>>(infos: I) -> Self {
        let mut tensors: Vec<TensorInfo> = infos.into_iter().collect();
        tensors.sort_by(|a, b| a.name.cmp(&b.name));
        Self { tensors }
    }

    /// Shape of the 2-D tensor with the most rows. Ties keep the first by name.
    pub fn guess_embedding_shape(&self) -> Option<(usize, usize)> {
        let mut best: Option<(usize, usize)> = None;
        for t in self.tensors.iter().filter(|t| t.shape.len() == 2) {
            let (rows, cols) = (t.shape[0], t.shape[1]);
            if best.map_or(true, |(best_rows, _)| rows > best_rows) {
                best = Some((rows, cols));
            }
        }
        best
    }

    /// Widest output dimension among 2-D "dense" tensors.
    pub fn guess_output_units(&self) -> Option<usize> {
        self.tensors
            .iter()
            .filter(|t| t.shape.len() == 2 && t.name.to_lowercase().contains("dense"))
            .map(|t| t.shape[1])
            .max()
    }

    pub fn get(&self, name: &str) -> Option<&TensorInfo> {
        self.tensors.iter().find(|t| t.name == name)
    }
}

/// Explicit values that replace sniffed ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchitectureOverrides {
    pub embedding_dim: Option<usize>,
    pub output_units: Option<usize>,
}

/// Final activation of the classifier head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutputHead {
    Sigmoid,
    Softmax,
}

/// The fixed classifier topology with its inferred sizes:
/// embedding(vocab_rows, embedding_dim, frozen) → LSTM(128, sequences) →
/// Dropout(0.5) → LSTM(128) → Dropout(0.5) → Dense(output_units, head).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchitectureSpec {
    pub vocab_rows: usize,
    pub embedding_dim: usize,
    pub recurrent_units: usize,
    pub dropout: f32,
    pub output_units: usize,
    pub head: OutputHead,
}

/// Infer the reconstruction target from the inventory and vocabulary size.
///
/// The embedding table gets `vocab_len + 1` rows (row 0 is padding, and
/// unknown tokens read it too). Output units default to 1 when no dense
/// tensor is found.
pub fn infer_architecture(
    inventory: &WeightsInventory,
    vocab_len: usize,
    overrides: &ArchitectureOverrides,
) -> Result<ArchitectureSpec> {
    let embedding_dim = match overrides.embedding_dim {
        Some(dim) => dim,
        None => {
            let (_rows, dim) = inventory
                .guess_embedding_shape()
                .ok_or_else(|| anyhow::anyhow!("Could not detect embedding shape in weights file"))?;
            dim
        }
    };

    let output_units = overrides
        .output_units
        .or_else(|| inventory.guess_output_units())
        .unwrap_or(1);

    if embedding_dim == 0 || output_units == 0 {
        anyhow::bail!(
            "Inferred a zero-sized layer (embedding_dim={embedding_dim}, output_units={output_units})"
        );
    }

    let head = if output_units == 1 {
        OutputHead::Sigmoid
    } else {
        OutputHead::Softmax
    };

    Ok(ArchitectureSpec {
        vocab_rows: vocab_len + 1,
        embedding_dim,
        recurrent_units: RECURRENT_UNITS,
        dropout: DROPOUT_RATE,
        output_units,
        head,
    })
}
