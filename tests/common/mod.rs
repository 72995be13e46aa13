// Shared fixtures for integration tests.
//
// Writes a small but complete artifact set into a temp directory: a
// word_to_index.json vocabulary of 4999 words and a weights-only
// classifier.safetensors named the way Keras names the layers of an
// embedding(5000, 64) → LSTM(128) → LSTM(128) → Dense(1) model.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use bullyscreen::config::{Config, VOCAB_FILE, WEIGHTS_FILE};
use candle_core::{DType, Device, Tensor};

pub const VOCAB_WORDS: usize = 4999;
pub const EMBEDDING_DIM: usize = 64;
pub const UNITS: usize = 128;

/// Real words placed at the front of the vocabulary (ids 1..).
pub const KNOWN_WORDS: &[&str] = &[
    "kill", "hate", "stupid", "ugly", "loser", "love", "friend", "great", "you", "not", "dog",
    "insult",
];

/// Fresh, empty directory under the system temp dir.
pub fn temp_artifact_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("bullyscreen-{name}"));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// word → id mapping with ids 1..=VOCAB_WORDS.
pub fn vocab_map() -> HashMap<String, u32> {
    let mut map = HashMap::with_capacity(VOCAB_WORDS);
    for (i, word) in KNOWN_WORDS.iter().enumerate() {
        map.insert(word.to_string(), i as u32 + 1);
    }
    for id in (KNOWN_WORDS.len() + 1)..=VOCAB_WORDS {
        map.insert(format!("filler{id}"), id as u32);
    }
    map
}

pub fn write_vocab(dir: &Path) -> PathBuf {
    let path = dir.join(VOCAB_FILE);
    std::fs::write(&path, serde_json::to_string(&vocab_map()).unwrap()).unwrap();
    path
}

fn filled(value: f32, shape: &[usize]) -> Tensor {
    Tensor::full(value, shape, &Device::Cpu).unwrap()
}

/// Keras-named weights with the given embedding and head sizes.
pub fn keras_weights(vocab_rows: usize, dim: usize, output_units: usize) -> HashMap<String, Tensor> {
    let gates = 4 * UNITS;
    // Distinct, bounded rows so cosine similarity is meaningful
    let embeddings = Tensor::arange(0u32, (vocab_rows * dim) as u32, &Device::Cpu)
        .unwrap()
        .to_dtype(DType::F32)
        .unwrap()
        .affine(0.37, 0.0)
        .unwrap()
        .sin()
        .unwrap()
        .reshape((vocab_rows, dim))
        .unwrap();

    let mut tensors = HashMap::new();
    tensors.insert("embedding/embeddings:0".to_string(), embeddings);
    tensors.insert("lstm/lstm_cell/kernel:0".to_string(), filled(0.01, &[dim, gates]));
    tensors.insert(
        "lstm/lstm_cell/recurrent_kernel:0".to_string(),
        filled(0.01, &[UNITS, gates]),
    );
    tensors.insert("lstm/lstm_cell/bias:0".to_string(), filled(0.0, &[gates]));
    tensors.insert("lstm_1/lstm_cell_1/kernel:0".to_string(), filled(0.01, &[UNITS, gates]));
    tensors.insert(
        "lstm_1/lstm_cell_1/recurrent_kernel:0".to_string(),
        filled(0.01, &[UNITS, gates]),
    );
    tensors.insert("lstm_1/lstm_cell_1/bias:0".to_string(), filled(0.0, &[gates]));
    tensors.insert("dense/kernel:0".to_string(), filled(0.02, &[UNITS, output_units]));
    tensors.insert("dense/bias:0".to_string(), filled(0.0, &[output_units]));
    tensors
}

pub fn write_weights(dir: &Path, output_units: usize) -> PathBuf {
    let path = dir.join(WEIGHTS_FILE);
    let tensors = keras_weights(VOCAB_WORDS + 1, EMBEDDING_DIM, output_units);
    candle_core::safetensors::save(&tensors, &path).unwrap();
    path
}

/// Vocabulary plus single-unit weights; no full model.
pub fn weights_only_artifacts(name: &str) -> Config {
    let dir = temp_artifact_dir(name);
    write_vocab(&dir);
    write_weights(&dir, 1);
    Config::with_artifact_dir(&dir)
}
