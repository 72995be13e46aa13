// Composition tests — verifying that pure functions chain together correctly.
//
// These tests exercise the data flow between modules:
//   Normalizer -> Vocabulary -> Encoder -> Score Interpreter
// without loading a model. Fixture vocabularies are written to the system
// temp directory.

mod common;

use bullyscreen::output::truncate_chars;
use bullyscreen::scoring::reputation::{interpret, visibility, PostSource, Standing, Visibility};
use bullyscreen::text::normalizer::Normalizer;
use bullyscreen::vocab::encoder::encode;
use bullyscreen::vocab::vocabulary::{Vocabulary, VocabularyOptions, PAD_ID};

// ============================================================
// Chain: Normalizer -> Encoder
// ============================================================

#[test]
fn cleaned_post_encodes_to_known_ids() {
    let normalizer = Normalizer::english();
    let vocab = Vocabulary::from_map(common::vocab_map(), VocabularyOptions::default()).unwrap();

    let cleaned = normalizer.clean("You are a stupid, ugly LOSER!!!");
    let batch = encode(&[cleaned.text.as_str()], &vocab, vocab.max_len());
    let row = batch.row(0);

    let expected: Vec<u32> = ["you", "stupid", "ugly", "loser"]
        .iter()
        .map(|w| vocab.get(w).unwrap())
        .collect();
    assert_eq!(&row[..expected.len()], expected.as_slice());
    assert!(row[expected.len()..].iter().all(|&id| id == PAD_ID));
}

#[test]
fn plurals_encode_like_their_singular() {
    let normalizer = Normalizer::english();
    let vocab = Vocabulary::from_map(common::vocab_map(), VocabularyOptions::default()).unwrap();

    let plural = normalizer.clean("insults");
    let singular = normalizer.clean("insult");
    assert_eq!(
        encode(&[plural.text.as_str()], &vocab, 5),
        encode(&[singular.text.as_str()], &vocab, 5)
    );
}

#[test]
fn adaptive_width_follows_the_longest_cleaned_post() {
    let normalizer = Normalizer::english();
    let vocab = Vocabulary::from_map(
        common::vocab_map(),
        VocabularyOptions {
            adaptive_max_len: true,
            ..VocabularyOptions::default()
        },
    )
    .unwrap();

    let long_post = vec!["loser"; 42].join(" ");
    let cleaned = normalizer.clean(&long_post);
    assert_eq!(cleaned.token_count, 42);

    let width = vocab.observe(cleaned.token_count);
    let batch = encode(&[cleaned.text.as_str()], &vocab, width);
    assert_eq!(batch.width(), 42);
    assert!(batch.row(0).iter().all(|&id| id == vocab.get("loser").unwrap()));
}

// ============================================================
// Chain: Score Interpreter over a posting history
// ============================================================

#[test]
fn repeated_bullying_eventually_blocks_the_account() {
    let mut standing = Standing {
        total: 0.0,
        reputation_score: 0.0,
    };
    assert_eq!(visibility(&standing), Visibility::Unrated);

    // A few clean posts establish a good record
    for _ in 0..3 {
        standing = interpret(0.1, standing, PostSource::Direct).standing;
    }
    assert_eq!(visibility(&standing), Visibility::Visible);

    // Sustained bullying drags the ratio under 5
    let mut posts = 0;
    while visibility(&standing) == Visibility::Visible {
        standing = interpret(0.95, standing, PostSource::Direct).standing;
        posts += 1;
        assert!(posts < 100, "never blocked: {standing:?}");
    }
    assert_eq!(visibility(&standing), Visibility::Blocked);
    assert_eq!(standing.reputation_score, 0.9);
}

#[test]
fn image_posts_are_punished_less_than_direct_posts() {
    let start = Standing {
        total: 2.0,
        reputation_score: 2.0,
    };
    let mut direct = start;
    let mut image = start;
    for _ in 0..5 {
        direct = interpret(0.9, direct, PostSource::Direct).standing;
        image = interpret(0.9, image, PostSource::Image).standing;
    }
    assert!(direct.total > image.total);
    assert_eq!(visibility(&direct), Visibility::Blocked);
    assert_eq!(visibility(&image), Visibility::Visible);
}

#[test]
fn truncated_preview_of_cleaned_text() {
    let normalizer = Normalizer::english();
    let cleaned = normalizer.clean(&"ugly ".repeat(50));
    let preview = truncate_chars(&cleaned.text, 20);
    assert!(preview.ends_with("..."));
    assert_eq!(preview.chars().count(), 23);
}
