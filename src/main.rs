//! # Wellness Feed
//!
//! Generates a multilingual JSON feed of short health and wellness articles
//! for a downstream site. Content comes from a built-in catalog or from a
//! single call to a Gemini-style generative-text API.
//!
//! ## Usage
//!
//! ```sh
//! wellness_feed generate                      # static catalog
//! wellness_feed generate --source remote      # needs GEMINI_API_KEY
//! wellness_feed append --lang en              # prepend one random tip
//! ```
//!
//! ## Architecture
//!
//! The application is a straight pipeline, run once per process:
//! 1. **Source**: obtain content entries (catalog or model output)
//! 2. **Assembly**: expand each entry into one post per language
//! 3. **Store**: write `site_feed.json` (overwrite, or append-without-duplicates)
//!
//! A run that obtains no content exits non-zero and leaves the feed file alone.

use chrono::Utc;
use clap::Parser;
use std::error::Error;
use std::process::ExitCode;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod assembler;
mod cli;
mod config;
mod models;
mod outputs;
mod pipeline;
mod sources;
mod utils;

use cli::{Cli, Command, SourceKind};
use config::FeedConfig;
use pipeline::{PipelineError, RunSummary, run_append, run_generate};
use sources::catalog::StaticCatalog;
use sources::remote::RemoteGenerator;

#[tokio::main]
async fn main() -> ExitCode {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("wellness_feed starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    match run(args).await {
        Ok(summary) => {
            info!(
                elapsed_ms = start_time.elapsed().as_millis() as u64,
                "Execution complete"
            );
            println!(
                "✅ Feed written to {} ({} posts, {} new)",
                summary.path.display(),
                summary.total,
                summary.added
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            if let Some(PipelineError::NoContent(_)) = e.downcast_ref::<PipelineError>() {
                warn!(error = %e, "No content obtained");
                eprintln!("⚠️  {e}");
            } else {
                error!(error = %e, "Run failed");
                eprintln!("❌ {e}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Cli) -> Result<RunSummary, Box<dyn Error>> {
    let mut config = FeedConfig::load(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;
    debug!(?config, "Effective configuration");

    let summary = match args.command {
        Command::Generate {
            source: SourceKind::Static,
        } => run_generate(&config, &StaticCatalog, Utc::now()).await?,
        Command::Generate {
            source: SourceKind::Remote,
        } => {
            // Credential check happens before anything touches the output directory
            let generator = RemoteGenerator::from_env(&config)?;
            run_generate(&config, &generator, Utc::now()).await?
        }
        Command::Append { .. } => run_append(&config, &mut rand::rng(), Utc::now()).await?,
    };
    Ok(summary)
}
