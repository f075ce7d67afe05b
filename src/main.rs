//! Text Lens - recognize text in bundled images
//!
//! Console front end: pick one of three bundled images, recognize its text
//! and show the words with their confidence.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use text_lens::config::{self, AppConfig};
use text_lens::ui::{self, render_result};
use text_lens::vision::{ConfidenceAggregation, RecognizerBackend};
use text_lens::{BundledImage, RecognitionOrchestrator, StateStore};

/// Text Lens - recognize text in bundled images
#[derive(Parser, Debug)]
#[command(name = "text-lens")]
#[command(about = "Recognize text in bundled images and show word confidence")]
struct Args {
    /// Configuration file (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Recognize a single image, print the result and exit
    #[arg(short, long, value_enum)]
    image: Option<BundledImage>,

    /// Directory holding the bundled images
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Recognition service base URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Replay a JSON recognition result instead of calling the service
    #[arg(long)]
    fixture: Option<PathBuf>,

    /// Scope of the total confidence product
    #[arg(long, value_enum)]
    aggregation: Option<ConfidenceAggregation>,

    /// Write the default configuration file and exit
    #[arg(long)]
    write_config: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => config::default_config_path()?,
    };

    if args.write_config {
        config::save_config(&AppConfig::default(), &config_path)
            .with_context(|| format!("Failed to write {:?}", config_path))?;
        println!("Wrote default configuration to {}", config_path.display());
        return Ok(());
    }

    let config = apply_overrides(load_or_create_config(&config_path), &args);

    let store = Arc::new(StateStore::new());
    let orchestrator = Arc::new(RecognitionOrchestrator::from_config(&config, store));

    match args.image {
        Some(image) => run_once(&orchestrator, &config, image).await,
        None => {
            info!("Text Lens starting...");
            let stdin = BufReader::new(tokio::io::stdin());
            ui::run_console(orchestrator, &config.display, stdin, tokio::io::stdout()).await?;
            info!("Text Lens shutdown complete");
            Ok(())
        }
    }
}

/// Load configuration from file or fall back to defaults
fn load_or_create_config(path: &Path) -> AppConfig {
    if path.exists() {
        match config::load_config(path) {
            Ok(config) => {
                info!("Loaded configuration from {:?}", path);
                return config;
            }
            Err(e) => warn!("Ignoring configuration: {:#}", e),
        }
    }
    info!("Using default configuration");
    AppConfig::default()
}

/// Command line flags take precedence over the file
fn apply_overrides(mut config: AppConfig, args: &Args) -> AppConfig {
    if let Some(dir) = &args.assets {
        config.assets.dir = dir.clone();
    }
    if let Some(endpoint) = &args.endpoint {
        config.recognition.backend = RecognizerBackend::Http;
        config.recognition.endpoint = endpoint.clone();
    }
    if let Some(fixture) = &args.fixture {
        config.recognition.backend = RecognizerBackend::Fixture;
        config.recognition.fixture = Some(fixture.clone());
    }
    if let Some(aggregation) = args.aggregation {
        config.recognition.aggregation = aggregation;
    }
    config
}

/// Recognize one image and print the result
async fn run_once(
    orchestrator: &RecognitionOrchestrator,
    config: &AppConfig,
    image: BundledImage,
) -> Result<()> {
    let outcome = orchestrator.recognize_text_in_image(image).await;
    print!("{}", render_result(&orchestrator.store().current(), &config.display));

    outcome
        .map(|_| ())
        .with_context(|| format!("Text recognition in {} failed", image))
}
