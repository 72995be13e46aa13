// Lexical normalizer: tokenize, lowercase, drop stopwords, lemmatize.
//
// Pronouns and negations are carried through even though every English
// stopword list contains them: "I will hurt you" and "I will not hurt you"
// must not collapse to the same cleaned text. The effective stopword set is
// the English list plus ASCII punctuation, minus the protected tokens.
//
// Cleaning never fails. If the word tokenizer is unavailable the normalizer
// falls back to whitespace splitting with the same stopword filter.

use std::collections::HashSet;

use anyhow::Result;
use stop_words::{get, LANGUAGE};
use tracing::{debug, warn};

use super::lemmatizer::lemmatize;
use super::tokenize::WordTokenizer;

/// Tokens that are never discarded, regardless of stopword status.
pub const PROTECTED_TOKENS: &[&str] = &[
    "i", "you", "he", "she", "they", "we", "us", "him", "her", "them", "his", "hers", "your",
    "yours", "my", "me", "mine", "our", "ours", "not", "no", "never", "n't",
];

/// ASCII punctuation characters, treated as stopwords.
const PUNCTUATION: &str = r##"!"#$%&'()*+,-./:;<=>?@[\]^_`{|}~"##;

/// A cleaned post: space-joined lemmas plus how many there are.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CleanedText {
    pub text: String,
    pub token_count: usize,
}

impl CleanedText {
    fn from_tokens(tokens: Vec<String>) -> Self {
        Self {
            token_count: tokens.len(),
            text: tokens.join(" "),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Stateless text cleaner. Build once, share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Normalizer {
    stopwords: HashSet<String>,
    tokenizer: Option<WordTokenizer>,
}

impl Normalizer {
    /// Normalizer using the NLTK English stopword list, the list the
    /// classifier's training text was cleaned with.
    pub fn english() -> Self {
        let stop_words: Vec<String> = get(LANGUAGE::English);
        Self::with_stopwords(stop_words)
    }

    /// Normalizer with a caller-supplied stopword list. Punctuation is always
    /// added and protected tokens are always removed from the set.
    pub fn with_stopwords<I, S>(stopwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set: HashSet<String> = stopwords
            .into_iter()
            .map(|w| w.as_ref().to_lowercase())
            .collect();
        set.extend(PUNCTUATION.chars().map(|c| c.to_string()));
        for token in PROTECTED_TOKENS {
            set.remove(*token);
        }

        let tokenizer = match WordTokenizer::new() {
            Ok(t) => Some(t),
            Err(e) => {
                warn!("Word tokenizer unavailable, cleaning will use whitespace split: {e:#}");
                None
            }
        };

        Self {
            stopwords: set,
            tokenizer,
        }
    }

    /// Whether `token` (already lowercased) is in the effective stopword set.
    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }

    /// Clean a post for encoding.
    pub fn clean(&self, text: &str) -> CleanedText {
        if text.trim().is_empty() {
            return CleanedText::default();
        }

        match self.try_clean(text) {
            Ok(cleaned) => cleaned,
            Err(e) => {
                debug!("Falling back to simple cleaning: {e:#}");
                self.simple_clean(text)
            }
        }
    }

    /// Full pipeline: word tokenize, lowercase, filter, lemmatize.
    ///
    /// A token whose lemma is itself a stopword is dropped too, so cleaning
    /// an already-cleaned string changes nothing.
    fn try_clean(&self, text: &str) -> Result<CleanedText> {
        let tokenizer = self
            .tokenizer
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("word tokenizer unavailable"))?;

        let words: Vec<String> = tokenizer
            .tokenize(text)
            .into_iter()
            .map(|w| w.to_lowercase())
            .filter(|w| !self.is_stopword(w))
            .map(|w| lemmatize(&w))
            .filter(|w| !self.is_stopword(w))
            .collect();

        Ok(CleanedText::from_tokens(words))
    }

    /// Degraded path: whitespace tokens, lowercased and stopword-filtered,
    /// no lemmatization. Input made only of stopwords cleans to empty, the
    /// same as on the full path.
    fn simple_clean(&self, text: &str) -> CleanedText {
        let words: Vec<String> = text
            .split_whitespace()
            .map(|w| w.to_lowercase())
            .filter(|w| !self.is_stopword(w))
            .collect();
        CleanedText::from_tokens(words)
    }
}
