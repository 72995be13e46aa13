use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use bullyscreen::config::Config;
use bullyscreen::output::terminal;
use bullyscreen::scoring::reputation::{self, PostSource, Standing};
use bullyscreen::text::normalizer::CleanedText;
use bullyscreen::toxicity::service::ClassifierService;
use bullyscreen::toxicity::weights::{infer_architecture, WeightsInventory};
use bullyscreen::vocab::vocabulary::Vocabulary;

/// bullyscreen: cyberbullying screening for user posts.
///
/// Cleans post text, encodes it against the trained vocabulary and scores it
/// with the bullying classifier. Scores feed a per-user reputation that
/// decides whether the user's posts stay visible.
#[derive(Parser)]
#[command(name = "bullyscreen", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean, encode and score one or more texts
    Classify {
        /// Texts to classify
        #[arg(required = true)]
        texts: Vec<String>,
    },

    /// List the tensors in the weights file and the architecture they imply
    Inspect,

    /// Show the vocabulary words closest to each word in embedding space
    Neighbors {
        /// Words to look up
        #[arg(required = true)]
        words: Vec<String>,

        /// Number of neighbours per word (default: 10)
        #[arg(short, long, default_value = "10")]
        k: usize,
    },

    /// Apply a toxicity score to a user's standing
    Reputation {
        /// Toxicity score of the post (0-1)
        #[arg(long)]
        score: f64,

        /// Current total accumulator
        #[arg(long)]
        total: f64,

        /// Current reputation accumulator
        #[arg(long)]
        reputation: f64,

        /// The text was extracted from an image
        #[arg(long)]
        image: bool,
    },

    /// Show artifact paths, vocabulary size and which model loads
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("bullyscreen=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Classify { texts } => {
            let config = Config::load()?;
            config.require_artifacts()?;
            let service = ClassifierService::new(config);

            let cleaned: Vec<CleanedText> =
                texts.iter().map(|t| service.normalizer().clean(t)).collect();
            let scores = service.predict_cleaned(&cleaned).await?;

            if let Ok(classifier) = service.load().await {
                info!(source = %classifier.model.source, "Classified with model");
            }
            terminal::display_classifications(&texts, &cleaned, &scores);
        }

        Commands::Inspect => {
            let config = Config::load()?;
            let inventory = WeightsInventory::from_file(&config.weights_path)?;

            // Architecture needs the vocabulary size; show the inventory alone
            // when the vocabulary is unavailable.
            let architecture =
                match Vocabulary::load(&config.vocab_path, config.vocabulary_options()) {
                    Ok(vocab) => Some(infer_architecture(
                        &inventory,
                        vocab.len(),
                        &config.overrides,
                    )?),
                    Err(e) => {
                        println!("{} {e:#}", "Vocabulary unavailable:".yellow());
                        None
                    }
                };

            println!("Weights: {}", config.weights_path.display());
            terminal::display_inventory(&inventory, architecture.as_ref());
        }

        Commands::Neighbors { words, k } => {
            let config = Config::load()?;
            config.require_artifacts()?;
            let service = ClassifierService::new(config);

            for word in &words {
                let query = word.to_lowercase();
                let neighbors = service.nearest_words(&query, k).await?;
                terminal::display_neighbors(&query, neighbors.as_deref());
            }
        }

        Commands::Reputation {
            score,
            total,
            reputation,
            image,
        } => {
            if !(0.0..=1.0).contains(&score) {
                anyhow::bail!("--score must be between 0 and 1, got {score}");
            }
            let before = Standing {
                total,
                reputation_score: reputation,
            };
            let source = if image {
                PostSource::Image
            } else {
                PostSource::Direct
            };
            let update = reputation::interpret(score, before, source);
            terminal::display_reputation(&before, &update);
        }

        Commands::Status => {
            let config = Config::load()?;
            let service = ClassifierService::new(config);
            bullyscreen::status::show(&service).await?;
        }
    }

    Ok(())
}
