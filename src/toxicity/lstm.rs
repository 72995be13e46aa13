// Reconstructed LSTM classifier for weights-only artifacts.
//
// Rebuilds the fixed topology described by `ArchitectureSpec` and fills it
// with tensors from the weights file, matched by Keras layer naming:
//
//   <layer>/.../embeddings        embedding table      [vocab_rows, dim]
//   lstm*/.../kernel              input kernel         [in, 4 * units]
//   lstm*/.../recurrent_kernel    recurrent kernel     [units, 4 * units]
//   lstm*/.../bias                gate bias            [4 * units]
//   dense*/.../kernel, bias       classifier head      [units, out], [out]
//
// A leading "model_weights/" group and ":0" suffixes are ignored. The two
// recurrent layers are taken in position order ("lstm" before "lstm_1").
// Gate order inside the 4*units blocks is Keras's: input, forget, cell, output.
// Dropout layers are identity at inference and have no tensors.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use candle_core::{DType, Device, IndexOp, Tensor, D};
use tracing::{debug, info};

use super::traits::SequenceModel;
use super::weights::{ArchitectureSpec, OutputHead, WeightsInventory};
use crate::vocab::encoder::EncodedBatch;

/// Role of a tensor within its layer, from the last path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Param {
    Embeddings,
    Kernel,
    RecurrentKernel,
    Bias,
}

/// Parsed tensor name: the layer it belongs to and its role.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ParamName {
    layer: String,
    param: Param,
}

fn parse_name(name: &str) -> Option<ParamName> {
    let trimmed = name.strip_prefix("model_weights/").unwrap_or(name);
    let mut segments = trimmed.split('/');
    let layer = segments.next()?.to_lowercase();
    let last = trimmed.rsplit('/').next()?;
    let last = last.split(':').next()?.to_lowercase();

    let param = match last.as_str() {
        "embeddings" => Param::Embeddings,
        "recurrent_kernel" => Param::RecurrentKernel,
        "kernel" => Param::Kernel,
        "bias" => Param::Bias,
        _ => return None,
    };
    Some(ParamName { layer, param })
}

/// Position of a layer among its siblings: "lstm" → 0, "lstm_1" → 1, "lstm_12" → 12.
fn layer_position(layer: &str) -> usize {
    layer
        .rsplit_once('_')
        .and_then(|(_, n)| n.parse::<usize>().ok())
        .unwrap_or(0)
}

fn by_position(a: &String, b: &String) -> Ordering {
    layer_position(a)
        .cmp(&layer_position(b))
        .then_with(|| a.cmp(b))
}

/// Logistic function built from primitive ops, so it works on the strided
/// views `chunk` returns.
fn sigmoid(x: &Tensor) -> candle_core::Result<Tensor> {
    x.neg()?.exp()?.affine(1.0, 1.0)?.recip()
}

/// One Keras-style LSTM layer.
struct LstmLayer {
    kernel: Tensor,
    recurrent: Tensor,
    bias: Tensor,
    units: usize,
}

impl LstmLayer {
    /// Run over `x: [batch, steps, in]`. Returns `[batch, steps, units]` when
    /// `return_sequences`, else the final hidden state `[batch, units]`.
    fn forward(&self, x: &Tensor, return_sequences: bool) -> candle_core::Result<Tensor> {
        let (batch, steps, features) = x.dims3()?;
        let gates_width = 4 * self.units;

        // Input projection for every step at once
        let projected = x
            .reshape((batch * steps, features))?
            .matmul(&self.kernel)?
            .reshape((batch, steps, gates_width))?;

        let mut h = Tensor::zeros((batch, self.units), DType::F32, x.device())?;
        let mut c = h.clone();
        let mut outputs = Vec::with_capacity(if return_sequences { steps } else { 0 });

        for step in 0..steps {
            let z = projected
                .i((.., step, ..))?
                .add(&h.matmul(&self.recurrent)?)?
                .broadcast_add(&self.bias)?;
            let gates = z.chunk(4, 1)?;
            let input_gate = sigmoid(&gates[0])?;
            let forget_gate = sigmoid(&gates[1])?;
            let candidate = gates[2].tanh()?;
            let output_gate = sigmoid(&gates[3])?;

            c = forget_gate.mul(&c)?.add(&input_gate.mul(&candidate)?)?;
            h = output_gate.mul(&c.tanh()?)?;

            if return_sequences {
                outputs.push(h.clone());
            }
        }

        if return_sequences {
            Tensor::stack(&outputs, 1)
        } else {
            Ok(h)
        }
    }
}

/// Final projection.
struct DenseLayer {
    kernel: Tensor,
    bias: Tensor,
}

pub struct LstmClassifier {
    spec: ArchitectureSpec,
    embeddings: Tensor,
    recurrent: [LstmLayer; 2],
    dense: DenseLayer,
    source: String,
}

impl LstmClassifier {
    /// Load tensors from a safetensors file and assemble the classifier.
    pub fn from_weights(
        path: &Path,
        inventory: &WeightsInventory,
        spec: ArchitectureSpec,
    ) -> Result<Self> {
        let tensors = candle_core::safetensors::load(path, &Device::Cpu)
            .with_context(|| format!("Failed to read tensors from {}", path.display()))?;
        Self::from_tensors(tensors, inventory, spec, &path.display().to_string())
    }

    /// Assemble from already-loaded tensors. `inventory` supplies the fallback
    /// embedding choice when no tensor is named `embeddings`.
    pub fn from_tensors(
        tensors: HashMap<String, Tensor>,
        inventory: &WeightsInventory,
        spec: ArchitectureSpec,
        source: &str,
    ) -> Result<Self> {
        let mut embeddings = None;
        let mut lstm: HashMap<String, HashMap<Param, Tensor>> = HashMap::new();
        let mut dense: HashMap<String, HashMap<Param, Tensor>> = HashMap::new();

        for (name, tensor) in &tensors {
            let Some(parsed) = parse_name(name) else {
                debug!(tensor = %name, "Ignoring unrecognized tensor");
                continue;
            };
            let tensor = tensor.to_dtype(DType::F32)?;
            if parsed.param == Param::Embeddings {
                embeddings = Some((name.clone(), tensor));
            } else if parsed.layer.contains("lstm") {
                lstm.entry(parsed.layer).or_default().insert(parsed.param, tensor);
            } else if parsed.layer.contains("dense") {
                dense.entry(parsed.layer).or_default().insert(parsed.param, tensor);
            }
        }

        // No tensor named "embeddings": fall back to the largest matrix
        let (embedding_name, embeddings) = match embeddings {
            Some(found) => found,
            None => {
                let (rows, cols) = inventory
                    .guess_embedding_shape()
                    .ok_or_else(|| anyhow::anyhow!("No embedding table in weights"))?;
                let name = inventory
                    .tensors
                    .iter()
                    .find(|t| t.shape == [rows, cols])
                    .map(|t| t.name.clone())
                    .ok_or_else(|| anyhow::anyhow!("No embedding table in weights"))?;
                let tensor = tensors
                    .get(&name)
                    .ok_or_else(|| anyhow::anyhow!("Embedding tensor {name} missing from file"))?
                    .to_dtype(DType::F32)?;
                (name, tensor)
            }
        };
        expect_shape(&embedding_name, &embeddings, &[spec.vocab_rows, spec.embedding_dim])
            .context("Embedding table does not match the vocabulary size and embedding dim")?;

        let mut lstm_layers: Vec<String> = lstm.keys().cloned().collect();
        lstm_layers.sort_by(by_position);
        if lstm_layers.len() != 2 {
            anyhow::bail!(
                "Expected 2 recurrent layers in weights, found {} ({:?})",
                lstm_layers.len(),
                lstm_layers
            );
        }

        let units = spec.recurrent_units;
        let first = take_lstm(&mut lstm, &lstm_layers[0], spec.embedding_dim, units)?;
        let second = take_lstm(&mut lstm, &lstm_layers[1], units, units)?;

        let dense = take_dense(dense, units, spec.output_units)?;

        info!(
            vocab_rows = spec.vocab_rows,
            embedding_dim = spec.embedding_dim,
            output_units = spec.output_units,
            head = ?spec.head,
            "Reconstructed LSTM classifier"
        );

        Ok(Self {
            spec,
            embeddings,
            recurrent: [first, second],
            dense,
            source: source.to_string(),
        })
    }

    pub fn spec(&self) -> &ArchitectureSpec {
        &self.spec
    }

    fn forward(&self, batch: &EncodedBatch) -> Result<Vec<Vec<f32>>> {
        let rows = self.spec.vocab_rows;
        let lookup = batch.lookup_ids();
        if let Some(&bad) = lookup.iter().find(|&&id| id as usize >= rows) {
            anyhow::bail!("Token id {bad} is outside the embedding table ({rows} rows)");
        }

        let device = self.embeddings.device();
        let len = lookup.len();
        let ids = Tensor::from_vec(lookup, len, device)?;
        let x = self
            .embeddings
            .index_select(&ids, 0)?
            .reshape((batch.rows(), batch.width(), self.spec.embedding_dim))?;

        // Dropout between layers is identity at inference
        let x = self.recurrent[0].forward(&x, true)?;
        let x = self.recurrent[1].forward(&x, false)?;

        let logits = x
            .matmul(&self.dense.kernel)?
            .broadcast_add(&self.dense.bias)?;
        let probs = match self.spec.head {
            OutputHead::Sigmoid => sigmoid(&logits)?,
            OutputHead::Softmax => candle_nn::ops::softmax(&logits, D::Minus1)?,
        };

        Ok(probs.to_vec2::<f32>()?)
    }
}

impl SequenceModel for LstmClassifier {
    fn predict(&self, batch: &EncodedBatch) -> Result<Vec<Vec<f32>>> {
        if batch.is_empty() || batch.width() == 0 {
            return Ok(vec![Vec::new(); batch.rows()]);
        }
        self.forward(batch)
    }

    fn output_units(&self) -> usize {
        self.spec.output_units
    }

    fn describe(&self) -> String {
        format!(
            "reconstructed LSTM from {} (embedding {}x{}, {} output units, {:?})",
            self.source,
            self.spec.vocab_rows,
            self.spec.embedding_dim,
            self.spec.output_units,
            self.spec.head
        )
    }

    fn embedding_table(&self) -> Option<&Tensor> {
        Some(&self.embeddings)
    }
}

fn expect_shape(name: &str, tensor: &Tensor, expected: &[usize]) -> Result<()> {
    if tensor.dims() != expected {
        anyhow::bail!(
            "Tensor {name} has shape {:?}, expected {:?}",
            tensor.dims(),
            expected
        );
    }
    Ok(())
}

fn take_param(
    params: &mut HashMap<Param, Tensor>,
    layer: &str,
    param: Param,
    expected: &[usize],
) -> Result<Tensor> {
    let tensor = params
        .remove(&param)
        .ok_or_else(|| anyhow::anyhow!("Layer {layer} has no {param:?} tensor"))?;
    expect_shape(&format!("{layer}/{param:?}"), &tensor, expected)?;
    Ok(tensor)
}

fn take_lstm(
    layers: &mut HashMap<String, HashMap<Param, Tensor>>,
    layer: &str,
    input_dim: usize,
    units: usize,
) -> Result<LstmLayer> {
    let params = layers
        .get_mut(layer)
        .ok_or_else(|| anyhow::anyhow!("Recurrent layer {layer} missing"))?;
    let gates = 4 * units;
    Ok(LstmLayer {
        kernel: take_param(params, layer, Param::Kernel, &[input_dim, gates])?,
        recurrent: take_param(params, layer, Param::RecurrentKernel, &[units, gates])?,
        bias: take_param(params, layer, Param::Bias, &[gates])?,
        units,
    })
}

/// Pick the dense layer whose kernel matches `[units, output_units]`,
/// first in position order.
fn take_dense(
    layers: HashMap<String, HashMap<Param, Tensor>>,
    units: usize,
    output_units: usize,
) -> Result<DenseLayer> {
    let mut names: Vec<String> = layers.keys().cloned().collect();
    names.sort_by(by_position);

    for name in &names {
        let params = &layers[name];
        let Some(kernel) = params.get(&Param::Kernel) else {
            continue;
        };
        if kernel.dims() != [units, output_units] {
            continue;
        }
        let bias = params
            .get(&Param::Bias)
            .ok_or_else(|| anyhow::anyhow!("Dense layer {name} has no bias"))?;
        expect_shape(&format!("{name}/bias"), bias, &[output_units])?;
        return Ok(DenseLayer {
            kernel: kernel.clone(),
            bias: bias.clone(),
        });
    }

    anyhow::bail!(
        "No dense layer with a [{units}, {output_units}] kernel among {:?}",
        names
    )
}
