// Nearest vocabulary words by embedding cosine similarity.
//
// A sanity check for loaded weights: if "kill" sits next to "murder" and
// "attack", the embedding table lines up with the vocabulary. If it sits next
// to noise, the vocabulary and weights artifacts don't belong together.

use anyhow::Result;
use candle_core::{Tensor, D};

use crate::vocab::vocabulary::Vocabulary;

/// A neighboring word and its cosine similarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub word: String,
    pub similarity: f32,
}

/// The `k` words whose embedding rows are most similar to `word`'s.
///
/// Returns `Ok(None)` when `word` is not in the vocabulary. Rows with no
/// vocabulary word (padding, unused ids) are skipped.
pub fn nearest_words(
    table: &Tensor,
    vocab: &Vocabulary,
    word: &str,
    k: usize,
) -> Result<Option<Vec<Neighbor>>> {
    let Some(idx) = vocab.get(&word.to_lowercase()) else {
        return Ok(None);
    };
    let (rows, _dim) = table.dims2()?;
    if idx as usize >= rows {
        anyhow::bail!("Word {word:?} has id {idx} but the embedding table has {rows} rows");
    }

    let query = table.get(idx as usize)?;
    let norms = table.sqr()?.sum(D::Minus1)?.sqrt()?;
    let query_norm = query.sqr()?.sum_all()?.sqrt()?.to_scalar::<f32>()?;
    let dots = table.matmul(&query.unsqueeze(1)?)?.squeeze(1)?;
    let sims = dots
        .div(&norms.affine((query_norm + 1e-12) as f64, 0.0)?)?
        .to_vec1::<f32>()?;

    let mut ranked: Vec<(usize, f32)> = sims
        .into_iter()
        .enumerate()
        .filter(|(i, s)| *i != idx as usize && s.is_finite())
        .collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let neighbors = ranked
        .into_iter()
        .filter_map(|(i, similarity)| {
            vocab.word(i as u32).map(|w| Neighbor {
                word: w.to_string(),
                similarity,
            })
        })
        .take(k)
        .collect();

    Ok(Some(neighbors))
}
