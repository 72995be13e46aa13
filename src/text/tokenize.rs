// Word-boundary tokenizer.
//
// Treebank-style splitting: punctuation becomes its own token and negative
// contractions are split so the negation survives as a separate "n't" token
// ("don't" → "do", "n't"). Keeping "n't" intact matters because it is one of
// the protected tokens the normalizer never drops.

use anyhow::{Context, Result};
use regex_lite::Regex;

/// Splits "wasn't" into "was n't" before tokenizing.
const CONTRACTION_PATTERN: &str = r"(?i)([a-z])(n't)\b";

/// Token alternatives, tried left to right at each position:
/// negation clitic, other clitics ('s, 're, 'll), hyphenated words, single
/// punctuation characters.
const TOKEN_PATTERN: &str =
    r"(?i)n't|'[a-z]+|[^\s[:punct:]]+(?:-[^\s[:punct:]]+)*|[[:punct:]]";

/// Compiled word tokenizer. Build once and share.
#[derive(Debug, Clone)]
pub struct WordTokenizer {
    contractions: Regex,
    tokens: Regex,
}

impl WordTokenizer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            contractions: Regex::new(CONTRACTION_PATTERN)
                .context("Failed to compile contraction pattern")?,
            tokens: Regex::new(TOKEN_PATTERN).context("Failed to compile token pattern")?,
        })
    }

    /// Split text into word and punctuation tokens, preserving case.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let expanded = self.contractions.replace_all(text, "$1 $2");
        self.tokens
            .find_iter(&expanded)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}
