// Sequence encoder: cleaned strings → fixed-width id matrix.
//
// Expects pre-cleaned, whitespace-joined tokens (the output of
// `Normalizer::clean`). The encoder itself only lowercases and splits on
// whitespace; it does not tokenize punctuation or lemmatize.

use super::vocabulary::{Vocabulary, PAD_ID};

/// Row-major `rows × width` matrix of token ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBatch {
    rows: usize,
    width: usize,
    ids: Vec<u32>,
    unknown_id: u32,
}

impl EncodedBatch {
    /// An all-padding batch.
    pub fn padding(rows: usize, width: usize) -> Self {
        Self {
            rows,
            width,
            ids: vec![PAD_ID; rows * width],
            unknown_id: PAD_ID,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// All ids, row after row.
    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    /// Id the encoder wrote for out-of-vocabulary tokens.
    pub fn unknown_id(&self) -> u32 {
        self.unknown_id
    }

    /// Ids as embedding rows. Trained models have no row for a distinct
    /// unknown id, so unknown tokens read the padding row, which is what
    /// they were encoded as during training.
    pub fn lookup_ids(&self) -> Vec<u32> {
        self.ids
            .iter()
            .map(|&id| if id == self.unknown_id { PAD_ID } else { id })
            .collect()
    }

    pub fn row(&self, i: usize) -> &[u32] {
        &self.ids[i * self.width..(i + 1) * self.width]
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }
}

/// Encode a batch. Known tokens get their vocabulary id, unknown tokens the
/// vocabulary's unknown id, and the remainder of each row is padding.
/// Tokens past `max_len` are dropped.
pub fn encode<S: AsRef<str>>(texts: &[S], vocab: &Vocabulary, max_len: usize) -> EncodedBatch {
    let mut ids = vec![PAD_ID; texts.len() * max_len];

    for (i, text) in texts.iter().enumerate() {
        let row = &mut ids[i * max_len..(i + 1) * max_len];
        let lowered = text.as_ref().to_lowercase();
        for (slot, word) in row.iter_mut().zip(lowered.split_whitespace()) {
            *slot = vocab.get(word).unwrap_or_else(|| vocab.unknown_id());
        }
    }

    EncodedBatch {
        rows: texts.len(),
        width: max_len,
        ids,
        unknown_id: vocab.unknown_id(),
    }
}
