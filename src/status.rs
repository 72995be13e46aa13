// System status display — artifact files, vocabulary size, resolved model.

use std::path::Path;

use anyhow::Result;

use crate::toxicity::service::ClassifierService;

/// Display system status to the terminal.
///
/// Lists each artifact with its size, then attempts a load so the report
/// shows which loading stage succeeded (or why none did).
pub async fn show(service: &ClassifierService) -> Result<()> {
    let config = service.config();
    println!("Artifact dir: {}", config.artifact_dir.display());
    print_artifact("Vocabulary", &config.vocab_path);
    print_artifact("Full model", &config.full_model_path);
    print_artifact("Weights", &config.weights_path);

    let mode = if config.adaptive_max_len {
        "adaptive"
    } else {
        "fixed"
    };
    println!("Sequence width: {} ({mode})", config.max_len);
    match config.unknown_id {
        Some(id) => println!("Unknown-word id: {id}"),
        None => println!("Unknown-word id: 0 (shared with padding)"),
    }

    match service.load().await {
        Ok(classifier) => {
            println!(
                "Vocabulary: {} words (max id {})",
                classifier.vocabulary.len(),
                classifier.vocabulary.max_id()
            );
            println!(
                "Model: {} via {}",
                classifier.model.model.describe(),
                classifier.model.source
            );
            println!("  loaded from {}", classifier.model.path.display());
        }
        Err(e) => {
            println!("Model: not loaded");
            println!("  {e}");
        }
    }

    Ok(())
}

fn print_artifact(label: &str, path: &Path) {
    match std::fs::metadata(path) {
        Ok(meta) => println!(
            "{label}: {} ({})",
            path.display(),
            format_bytes(meta.len())
        ),
        Err(_) => println!("{label}: {} (missing)", path.display()),
    }
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
