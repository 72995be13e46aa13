// Word → id mapping with the sequence-length bound used for encoding.
//
// Loaded once per process from a read-only artifact and never mutated. Two
// artifact formats are accepted:
//   - JSON object `{"word": id, ...}` — the exported training vocabulary
//   - GloVe text (`word v1 v2 ...` per line) — ids assigned from 1 in file order
//
// Id 0 is reserved for padding (and, unless `unknown_id` is configured, for
// out-of-vocabulary tokens), so no word in the artifact may use it.
//
// `max_len` is fixed at load time. When adaptive mode is on it can only grow,
// through `observe`, as an atomic monotonic maximum.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
use tracing::info;

/// Sequence length used when nothing else is configured.
pub const DEFAULT_MAX_LEN: usize = 30;

/// Id written for padding positions.
pub const PAD_ID: u32 = 0;

/// Encoding parameters that travel with the vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub struct VocabularyOptions {
    /// Baseline sequence width.
    pub max_len: usize,
    /// Let `observe` widen `max_len` to the longest cleaned input seen.
    pub adaptive_max_len: bool,
    /// Distinct id for out-of-vocabulary tokens. `None` maps them to 0.
    pub unknown_id: Option<u32>,
}

impl Default for VocabularyOptions {
    fn default() -> Self {
        Self {
            max_len: DEFAULT_MAX_LEN,
            adaptive_max_len: false,
            unknown_id: None,
        }
    }
}

#[derive(Debug)]
pub struct Vocabulary {
    word_to_index: HashMap<String, u32>,
    index_to_word: HashMap<u32, String>,
    max_len: AtomicUsize,
    adaptive: bool,
    unknown_id: u32,
}

impl Vocabulary {
    /// Load the vocabulary artifact. JSON if the extension is `.json`,
    /// GloVe text otherwise.
    pub fn load(path: &Path, options: VocabularyOptions) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!(
                "Vocabulary artifact not found: {}\nSet BULLYSCREEN_VOCAB_PATH or place word_to_index.json in the artifact directory.",
                path.display()
            );
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read vocabulary from {}", path.display()))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let map = if is_json {
            serde_json::from_str::<HashMap<String, u32>>(&raw).with_context(|| {
                format!("Vocabulary at {} is not a word→id JSON object", path.display())
            })?
        } else {
            parse_glove(&raw)
                .with_context(|| format!("Failed to parse GloVe vocabulary {}", path.display()))?
        };

        let vocab = Self::from_map(map, options)
            .with_context(|| format!("Corrupt vocabulary artifact {}", path.display()))?;

        info!(
            words = vocab.len(),
            max_len = vocab.max_len(),
            path = %path.display(),
            "Loaded vocabulary"
        );
        Ok(vocab)
    }

    /// Build from an in-memory mapping. Keys are lowercased; two keys that
    /// lowercase to the same word, or two words sharing an id, make the
    /// artifact corrupt.
    pub fn from_map(map: HashMap<String, u32>, options: VocabularyOptions) -> Result<Self> {
        if map.is_empty() {
            anyhow::bail!("vocabulary is empty");
        }
        if options.max_len == 0 {
            anyhow::bail!("max_len must be at least 1");
        }

        let mut word_to_index = HashMap::with_capacity(map.len());
        let mut index_to_word = HashMap::with_capacity(map.len());
        for (word, id) in map {
            if id == PAD_ID {
                anyhow::bail!("word {word:?} uses reserved id 0");
            }
            let lowered = word.to_lowercase();
            if let Some(previous) = word_to_index.insert(lowered.clone(), id) {
                anyhow::bail!(
                    "word {word:?} collides after lowercasing (ids {previous} and {id})"
                );
            }
            if let Some(other) = index_to_word.insert(id, lowered) {
                anyhow::bail!("id {id} is assigned to both {other:?} and {word:?}");
            }
        }

        let unknown_id = options.unknown_id.unwrap_or(PAD_ID);
        if let Some(word) = index_to_word.get(&unknown_id) {
            anyhow::bail!("unknown id {unknown_id} is already assigned to {word:?}");
        }

        Ok(Self {
            word_to_index,
            index_to_word,
            max_len: AtomicUsize::new(options.max_len),
            adaptive: options.adaptive_max_len,
            unknown_id,
        })
    }

    /// Number of words. The embedding table has `len() + 1` rows (row 0 is padding).
    pub fn len(&self) -> usize {
        self.word_to_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.word_to_index.is_empty()
    }

    pub fn get(&self, word: &str) -> Option<u32> {
        self.word_to_index.get(word).copied()
    }

    pub fn word(&self, id: u32) -> Option<&str> {
        self.index_to_word.get(&id).map(String::as_str)
    }

    /// Id written for tokens missing from the vocabulary.
    pub fn unknown_id(&self) -> u32 {
        self.unknown_id
    }

    /// Largest id in use, including the unknown id.
    pub fn max_id(&self) -> u32 {
        self.index_to_word
            .keys()
            .copied()
            .max()
            .unwrap_or(PAD_ID)
            .max(self.unknown_id)
    }

    /// Current sequence width.
    pub fn max_len(&self) -> usize {
        self.max_len.load(Ordering::Acquire)
    }

    pub fn is_adaptive(&self) -> bool {
        self.adaptive
    }

    /// Record the token count of a cleaned input. In adaptive mode this raises
    /// `max_len` to at least `token_count`; otherwise it does nothing.
    /// Returns the width to encode with.
    pub fn observe(&self, token_count: usize) -> usize {
        if !self.adaptive {
            return self.max_len();
        }
        let previous = self.max_len.fetch_max(token_count, Ordering::AcqRel);
        previous.max(token_count)
    }
}

/// Assign ids 1.. to the first field of each non-blank GloVe line.
fn parse_glove(raw: &str) -> Result<HashMap<String, u32>> {
    let mut map = HashMap::new();
    let mut next_id: u32 = 1;
    for (line_no, line) in raw.lines().enumerate() {
        let Some(word) = line.split_whitespace().next() else {
            continue;
        };
        if map.contains_key(word) {
            anyhow::bail!("duplicate word {word:?} on line {}", line_no + 1);
        }
        map.insert(word.to_string(), next_id);
        next_id = next_id
            .checked_add(1)
            .ok_or_else(|| anyhow::anyhow!("too many words for u32 ids"))?;
    }
    Ok(map)
}
