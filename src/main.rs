//! breedscan - command-line driver
//!
//! Stands in for the capture surface: reads an image file, runs one scan
//! through the orchestrator, and prints the merged result plus the rolling
//! history. Ctrl-C while a scan is in flight requests cooperative
//! cancellation.

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use breedscan::{
    config, BreedInfoClient, HistoryEntry, HistoryStore, ScanError, ScanOrchestrator, ScanOutcome,
    ScanResult, VisionClient,
};

/// Command-line arguments for breedscan
#[derive(Parser, Debug)]
#[command(name = "breedscan")]
#[command(about = "Identify a dog's breed from a photo")]
#[command(version)]
struct Args {
    /// Image file to scan (JPEG)
    image: Option<PathBuf>,

    /// Print the stored scan history and exit
    #[arg(long)]
    history: bool,

    /// Config file path
    #[arg(short, long, env = "BREEDSCAN_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "breedscan=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let toml_config = config::load_toml_config(args.config.as_deref())?;

    let history = Arc::new(HistoryStore::new(config::resolve_history_path(&toml_config)));
    history.load().await;

    if args.history {
        print_history(&history.list().await);
        return Ok(());
    }

    let image_path = args
        .image
        .context("no image file given (run with --help for usage)")?;

    let gemini_key = config::resolve_gemini_api_key(&toml_config)?;
    let dog_api_key = config::resolve_dog_api_key(&toml_config)?;

    let vision = Arc::new(VisionClient::new(gemini_key)?);
    let reference = Arc::new(BreedInfoClient::new(dog_api_key)?);
    let orchestrator = Arc::new(ScanOrchestrator::new(vision, reference, history.clone()));

    // Ctrl-C requests cooperative cancellation of the in-flight scan; the
    // dispatched network call resolves in the background and is discarded.
    {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Cancellation requested");
                orchestrator.cancel().await;
            }
        });
    }

    let image = tokio::fs::read(&image_path)
        .await
        .map_err(|e| anyhow!("{}", ScanError::ImageRead(e).user_message()))?;

    info!(image = %image_path.display(), "Starting scan");

    match orchestrator
        .start_scan(image, image_path.display().to_string())
        .await
    {
        Ok(ScanOutcome::Completed(result)) => {
            print_result(&result);
            print_history(&history.list().await);
        }
        Ok(ScanOutcome::Cancelled) => {
            println!("Scan cancelled.");
        }
        Err(e) => {
            bail!("{}", e.user_message());
        }
    }

    Ok(())
}

fn print_result(result: &ScanResult) {
    println!("Breed analysis:");
    for breed in &result.breeds {
        println!("  {:<30} {:>5.1}%", breed.name, breed.confidence);
    }
    println!();
    println!("Fun fact: {}", result.fact);
    println!();
    println!("Reference:");
    println!("  Origin:          {}", result.reference.origin);
    println!("  Temperament:     {}", result.reference.temperament);
    println!("  Lifespan:        {}", result.reference.lifespan);
    println!("  Size & weight:   {}", result.reference.size_and_weight);
    println!("  Common traits:   {}", result.reference.common_traits);
}

fn print_history(entries: &[HistoryEntry]) {
    if entries.is_empty() {
        return;
    }
    println!();
    println!("Recent scans:");
    for entry in entries {
        let breed = entry
            .result
            .primary_breed()
            .unwrap_or("Unknown");
        println!("  {}  {}  ({})", entry.id, breed, entry.image_ref);
    }
}
