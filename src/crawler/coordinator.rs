//! Crawl coordinator - two-phase run orchestration
//!
//! A run has two phases:
//! - Discovery walks the listing pages and collects item identifiers
//! - The fetch queue fetches and aggregates every discovered item
//!
//! A discovery failure fails the whole run; item failures only shrink the
//! record set.

use crate::config::{Config, CrawlerConfig, SourceKind};
use crate::crawler::discovery::DiscoveryWalker;
use crate::crawler::progress::{ProgressListener, ProgressSnapshot};
use crate::crawler::queue::{FetchQueue, ItemFailure};
use crate::crawler::FetchEngine;
use crate::record::CanonicalRecord;
use crate::source::{AdidasSource, Source};
use crate::HarvestError;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Everything a finished run produced
#[derive(Debug)]
pub struct CrawlOutcome {
    /// Name of the crawled source
    pub source: String,

    /// Number of identifiers returned by discovery
    pub discovered: usize,

    pub records: Vec<CanonicalRecord>,
    pub failures: Vec<ItemFailure>,
    pub progress: ProgressSnapshot,

    /// Items not fetched because the run was cancelled
    pub skipped: usize,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlOutcome {
    pub fn was_cancelled(&self) -> bool {
        self.skipped > 0
    }
}

/// Main crawl coordinator for one source
pub struct Coordinator<S> {
    source: Arc<S>,
    item_limit: usize,
    workers: usize,
    listener: Option<ProgressListener>,
}

impl<S: Source> Coordinator<S> {
    /// Creates a coordinator
    ///
    /// # Arguments
    ///
    /// * `source` - The catalog to crawl
    /// * `config` - Supplies the item limit and the worker count
    pub fn new(source: Arc<S>, config: &CrawlerConfig) -> Self {
        Self {
            source,
            item_limit: config.item_limit,
            workers: config.workers,
            listener: None,
        }
    }

    /// Sets the callback receiving detail-phase progress
    pub fn with_listener(mut self, listener: Option<ProgressListener>) -> Self {
        self.listener = listener;
        self
    }

    /// Runs discovery and then the fetch queue
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOutcome)` - The run finished, possibly with item failures
    /// * `Err(HarvestError)` - Discovery failed or was cancelled; nothing was produced
    pub async fn run(&self, cancel: CancellationToken) -> Result<CrawlOutcome, HarvestError> {
        let started_at = Utc::now();
        tracing::info!(
            "Starting crawl of {} (limit: {}, workers: {})",
            self.source.name(),
            self.item_limit,
            self.workers
        );

        let items = DiscoveryWalker::new(self.source.clone(), self.item_limit, cancel.clone())
            .walk()
            .await?;
        let discovered = items.len();
        tracing::info!("Discovered {} items", discovered);

        let outcome = FetchQueue::new(self.source.clone(), self.workers, cancel)
            .with_listener(self.listener.clone())
            .run(items)
            .await;

        tracing::info!(
            "Crawl finished: {} records, {} failures, {} skipped",
            outcome.records.len(),
            outcome.failures.len(),
            outcome.skipped
        );

        Ok(CrawlOutcome {
            source: self.source.name().to_string(),
            discovered,
            records: outcome.records,
            failures: outcome.failures,
            progress: outcome.progress,
            skipped: outcome.skipped,
            started_at,
            finished_at: Utc::now(),
        })
    }
}

/// Builds the fetch engine and the configured source, then runs a crawl
///
/// This is the main entry point for starting a crawl.
///
/// # Arguments
///
/// * `config` - The harvester configuration
/// * `cancel` - Cancels the run at the next page or item boundary
/// * `listener` - Optional callback receiving progress snapshots
pub async fn run_crawl(
    config: Config,
    cancel: CancellationToken,
    listener: Option<ProgressListener>,
) -> Result<CrawlOutcome, HarvestError> {
    crate::config::validate(&config)?;
    let engine = Arc::new(FetchEngine::new(&config.crawler, &config.user_agent)?);

    match config.source.kind {
        SourceKind::Adidas => {
            let source = Arc::new(AdidasSource::new(engine, &config.source)?);
            Coordinator::new(source, &config.crawler)
                .with_listener(listener)
                .run(cancel)
                .await
        }
    }
}
