// Unit tests for the lexical normalizer.
//
// Tests the cleaning pipeline end to end: stopword and punctuation removal,
// protection of pronouns and negations, lemmatization, and idempotence.

use bullyscreen::text::lemmatizer::lemmatize;
use bullyscreen::text::normalizer::{Normalizer, PROTECTED_TOKENS};

fn tokens(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

// ============================================================
// Idempotence
// ============================================================

#[test]
fn cleaning_twice_changes_nothing() {
    let normalizer = Normalizer::english();
    let inputs = [
        "You are SO stupid, nobody likes you!!!",
        "I don't think they're coming to the party.",
        "The dogs were chasing the buses across the fields",
        "Never ever talk to me again... seriously.",
        "great job on the presentation today :)",
        "",
        "   ",
    ];

    for input in inputs {
        let once = normalizer.clean(input);
        let twice = normalizer.clean(&once.text);
        assert_eq!(once.text, twice.text, "not idempotent for {input:?}");
        assert_eq!(once.token_count, twice.token_count);
    }
}

// ============================================================
// Filtering
// ============================================================

#[test]
fn protected_tokens_survive_cleaning() {
    let normalizer = Normalizer::english();
    let cleaned = normalizer.clean("I will never forgive you, not ever, and they know it");
    let words = tokens(&cleaned.text);

    for kept in ["i", "never", "you", "not", "they"] {
        assert!(words.contains(&kept.to_string()), "{kept} missing from {words:?}");
    }
}

#[test]
fn protected_tokens_are_not_stopwords() {
    let normalizer = Normalizer::english();
    for token in PROTECTED_TOKENS {
        assert!(!normalizer.is_stopword(token), "{token} treated as stopword");
    }
}

#[test]
fn punctuation_and_stopwords_are_removed() {
    let normalizer = Normalizer::english();
    let cleaned = normalizer.clean("The cat, and the hat!!");
    let words = tokens(&cleaned.text);

    assert!(!words.iter().any(|w| w == "the" || w == "and"));
    assert!(!words.iter().any(|w| w.chars().all(|c| c.is_ascii_punctuation())));
    assert!(words.contains(&"cat".to_string()));
}

#[test]
fn content_words_survive_the_english_list() {
    let normalizer = Normalizer::english();
    for word in ["nobody", "great", "like", "want", "go", "away", "nothing", "everyone"] {
        assert!(!normalizer.is_stopword(word), "{word} treated as stopword");
    }

    let cleaned =
        normalizer.clean("nobody likes you, shut up and go away you fat loser, I want you to die");
    assert_eq!(
        cleaned.text,
        "nobody like you shut go away you fat loser i want you die"
    );
}

#[test]
fn output_is_lowercase_and_single_spaced() {
    let normalizer = Normalizer::english();
    let cleaned = normalizer.clean("LOSERS   Everywhere\tTonight");
    assert_eq!(cleaned.text, cleaned.text.to_lowercase());
    assert!(!cleaned.text.contains("  "));
    assert_eq!(cleaned.token_count, tokens(&cleaned.text).len());
}

#[test]
fn empty_input_cleans_to_empty() {
    let normalizer = Normalizer::english();
    assert!(normalizer.clean("").is_empty());
    assert!(normalizer.clean(" \n\t ").is_empty());
}

#[test]
fn custom_stopword_list_is_respected() {
    let normalizer = Normalizer::with_stopwords(["banana"]);
    let cleaned = normalizer.clean("banana split");
    assert_eq!(cleaned.text, "split");
}

// ============================================================
// Lemmatization
// ============================================================

#[test]
fn plural_nouns_reduce_to_singular() {
    assert_eq!(lemmatize("dogs"), "dog");
    assert_eq!(lemmatize("insults"), "insult");
    assert_eq!(lemmatize("boxes"), "box");
}

#[test]
fn words_without_plural_endings_are_unchanged() {
    assert_eq!(lemmatize("glass"), "glass");
    assert_eq!(lemmatize("bus"), "bus");
    assert_eq!(lemmatize("kill"), "kill");
}

#[test]
fn cleaning_lemmatizes_each_token() {
    let normalizer = Normalizer::english();
    let cleaned = normalizer.clean("dogs insults");
    assert_eq!(cleaned.text, "dog insult");
}
