//! quakewatch - Main Entry Point

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use quake_common::init_logging;
use quake_config::{Config, ConfigLoader};
use quake_feed::{FeedPipeline, UsgsClient};
use quake_watch::{export_filter, run_export, run_places, run_watch, WatchError};
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path (TOML or YAML)
    #[arg(short, long, env = "QUAKEWATCH_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Log level or filter directive, overrides the configuration
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Mode>,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Refresh periodically and accept filter commands on stdin (default)
    Watch,
    /// Fetch once, filter and write CSV
    Export {
        /// Output file
        #[arg(short, long)]
        out: PathBuf,
        /// Place substring, case-insensitive
        #[arg(long)]
        place: Option<String>,
        /// First day to include, yyyy-MM-dd
        #[arg(long)]
        since: Option<String>,
    },
    /// Fetch once and print the distinct regions
    Places,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let result = runtime.block_on(run(args));

    // A pending stdin read would otherwise hold the runtime open after quit
    runtime.shutdown_timeout(Duration::from_millis(250));
    result
}

async fn run(args: Args) -> Result<()> {
    let mut config = ConfigLoader::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }

    // Kept alive so buffered file logs are flushed on exit
    let _log_guard = init_logging(config.logging.to_logging_config())
        .map_err(|e| WatchError::Logging(e.to_string()))?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting quakewatch");

    let client = UsgsClient::from_config(&config.feed)?;
    info!(url = %client.url(), "Feed configured");
    let pipeline = FeedPipeline::new(client);

    match args.command.unwrap_or(Mode::Watch) {
        Mode::Watch => watch(&config, pipeline).await?,
        Mode::Export { out, place, since } => {
            let filter =
                export_filter(place.as_deref(), since.as_deref(), config.feed.start_date)?;
            let rows = run_export(&pipeline, &filter, &out).await?;
            println!("Exported {rows} rows to {}", out.display());
        }
        Mode::Places => {
            for place in run_places(&pipeline).await? {
                println!("{place}");
            }
        }
    }

    Ok(())
}

async fn watch(config: &Config, pipeline: FeedPipeline<UsgsClient>) -> Result<()> {
    let cancel = CancellationToken::new();

    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupted");
                ctrl_c.cancel();
            }
            Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
        }
    });

    let input = BufReader::new(tokio::io::stdin());
    run_watch(config, pipeline, input, std::io::stdout(), cancel).await?;

    info!("quakewatch stopped");
    Ok(())
}
