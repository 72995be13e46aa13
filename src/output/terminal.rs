// Colored terminal output for classifications, weights and standings.
//
// This module handles all terminal-specific formatting: colors and tables.
// The main.rs command handlers delegate here.

use colored::Colorize;

use crate::scoring::reputation::{self, ReputationUpdate, Standing, Visibility, BENIGN_THRESHOLD};
use crate::text::normalizer::CleanedText;
use crate::toxicity::neighbors::Neighbor;
use crate::toxicity::traits::ClassificationScore;
use crate::toxicity::weights::{ArchitectureSpec, WeightsInventory};

/// Display one row per classified text, with the cleaned form underneath.
pub fn display_classifications(
    texts: &[String],
    cleaned: &[CleanedText],
    scores: &[ClassificationScore],
) {
    if texts.is_empty() {
        println!("Nothing to classify.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Classification ({} texts) ===", texts.len()).bold()
    );
    println!();
    println!(
        "  {:>6}  {:<10}  {}",
        "Score".dimmed(),
        "Label".dimmed(),
        "Text".dimmed()
    );
    println!("  {}", "-".repeat(78).dimmed());

    for ((text, clean), score) in texts.iter().zip(cleaned).zip(scores) {
        let preview = super::truncate_chars(text, 60);
        println!(
            "  {:>6.3}  {:<10}  {}",
            score.toxicity(),
            colorize_label(score.toxicity()),
            preview
        );
        println!(
            "          {} {}",
            "cleaned:".dimmed(),
            super::truncate_chars(&clean.text, 60).dimmed()
        );
        if score.is_distribution() {
            let dist: Vec<String> = score
                .probabilities
                .iter()
                .map(|p| format!("{p:.3}"))
                .collect();
            println!("          {}", format!("[{}]", dist.join(", ")).dimmed());
        }
    }
    println!();
}

/// Display every tensor in a weights file and what reconstruction would build.
pub fn display_inventory(inventory: &WeightsInventory, architecture: Option<&ArchitectureSpec>) {
    println!(
        "\n{}",
        format!("=== Weights ({} tensors) ===", inventory.tensors.len()).bold()
    );
    println!();
    for tensor in &inventory.tensors {
        println!("  {:<50} {:?}", tensor.name, tensor.shape);
    }

    match inventory.guess_embedding_shape() {
        Some((rows, dim)) => println!("\n  Embedding guess: {rows} x {dim}"),
        None => println!("\n  Embedding guess: {}", "none".yellow()),
    }
    match inventory.guess_output_units() {
        Some(units) => println!("  Output units guess: {units}"),
        None => println!("  Output units guess: {} (defaults to 1)", "none".yellow()),
    }

    if let Some(arch) = architecture {
        println!("\n  {}", "Reconstructed architecture:".bold());
        println!(
            "    Embedding({}, {}, frozen)",
            arch.vocab_rows, arch.embedding_dim
        );
        println!("    LSTM({}, return_sequences)", arch.recurrent_units);
        println!("    Dropout({})", arch.dropout);
        println!("    LSTM({})", arch.recurrent_units);
        println!("    Dropout({})", arch.dropout);
        println!("    Dense({}, {:?})", arch.output_units, arch.head);
    }
}

/// Display the nearest neighbours of a word, or a note if it is unknown.
pub fn display_neighbors(word: &str, neighbors: Option<&[Neighbor]>) {
    let Some(neighbors) = neighbors else {
        println!("  {} {}", word.bold(), "(not in vocabulary)".dimmed());
        return;
    };

    println!("\n  {}", format!("Closest to {word:?}:").bold());
    if neighbors.is_empty() {
        println!("    {}", "no comparable words".dimmed());
    }
    for (i, n) in neighbors.iter().enumerate() {
        println!("    {:>2}. {:<24} {:.3}", i + 1, n.word, n.similarity);
    }
}

/// Display a standing before and after one classified post.
pub fn display_reputation(before: &Standing, update: &ReputationUpdate) {
    let kind = if update.delta_is_reward {
        "reward".green()
    } else {
        "penalty".red()
    };
    println!("\n{}", "=== Reputation ===".bold());
    println!("  Delta: {:+.2} ({kind})", update.delta);
    println!(
        "  Total: {:.2} -> {:.2}",
        before.total, update.standing.total
    );
    println!(
        "  Reputation score: {:.2} -> {:.2}",
        before.reputation_score, update.standing.reputation_score
    );
    display_standing(&update.standing);
}

/// Display the ratio and visibility for a standing.
pub fn display_standing(standing: &Standing) {
    match reputation::reputation_ratio(standing) {
        Ok(ratio) => println!("  Ratio: {ratio:.2}/10"),
        Err(e) => println!("  Ratio: {}", e.to_string().dimmed()),
    }
    println!(
        "  Visibility: {}",
        colorize_visibility(reputation::visibility(standing))
    );
}

fn colorize_label(score: f64) -> colored::ColoredString {
    if score < BENIGN_THRESHOLD {
        "benign".green()
    } else {
        "bullying".red().bold()
    }
}

fn colorize_visibility(visibility: Visibility) -> colored::ColoredString {
    match visibility {
        Visibility::Visible => visibility.as_str().green(),
        Visibility::Blocked => visibility.as_str().red().bold(),
        Visibility::Unrated => visibility.as_str().dimmed(),
    }
}
