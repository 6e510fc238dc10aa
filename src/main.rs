//! Sku-Harvest main entry point
//!
//! This is the command-line interface for the Sku-Harvest catalog harvester.

use anyhow::Context;
use clap::{Parser, Subcommand};
use sku_harvest::config::{hash_content, load_config_with_hash, Config};
use sku_harvest::crawler::run_crawl;
use sku_harvest::output::{print_report, write_outputs, CrawlReport};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Sku-Harvest: a polite product catalog harvester
///
/// Sku-Harvest walks a paginated catalog listing, fetches every item's
/// detail, size chart and rating data, and writes one record per item.
#[derive(Parser, Debug)]
#[command(name = "sku-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A polite product catalog harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl the catalog and write the CSV and JSON outputs
    Start,

    /// Crawl a few items and log the records without writing files
    Check {
        /// Number of items to crawl
        #[arg(long, default_value_t = 5)]
        dump: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = load(cli.config.as_deref())?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight items");
            on_interrupt.cancel();
        }
    });

    match cli.command {
        Command::Start => handle_start(config, &config_hash, cancel, cli.quiet).await,
        Command::Check { dump } => handle_check(config, dump, cancel).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sku_harvest=info,warn"),
            1 => EnvFilter::new("sku_harvest=debug,info"),
            2 => EnvFilter::new("sku_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file, or the defaults when no file is given
fn load(path: Option<&std::path::Path>) -> anyhow::Result<(Config, String)> {
    match path {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok((config, hash))
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Ok((Config::default(), hash_content("")))
        }
    }
}

/// Handles `start`: full crawl with file outputs and a report
async fn handle_start(
    config: Config,
    config_hash: &str,
    cancel: CancellationToken,
    quiet: bool,
) -> anyhow::Result<()> {
    let output = config.output.clone();

    let outcome = match run_crawl(config, cancel, None).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    if outcome.was_cancelled() {
        tracing::warn!(
            "Writing partial results ({} items were not fetched)",
            outcome.skipped
        );
    }
    write_outputs(&output, &outcome.records).context("Failed to write outputs")?;

    if !quiet {
        print_report(&CrawlReport::from_outcome(&outcome, config_hash));
    }
    Ok(())
}

/// Handles `check`: a short crawl whose records are only logged
async fn handle_check(
    mut config: Config,
    dump: usize,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    config.crawler.item_limit = dump;
    tracing::info!("Checking the first {} items", dump);

    let outcome = run_crawl(config, cancel, None).await?;
    for record in &outcome.records {
        tracing::info!("{}", serde_json::to_string_pretty(record)?);
    }

    tracing::info!(
        "Check finished: {} records, {} failures",
        outcome.records.len(),
        outcome.failures.len()
    );
    Ok(())
}
