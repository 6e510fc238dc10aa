//! Bounded detail-fetch queue
//!
//! Every discovered identifier is fetched exactly once by a fixed number of
//! concurrent workers. Per-item failures are logged, recorded and skipped;
//! they never abort the run. Results are merged once all workers are done.

use crate::crawler::aggregator::RecordAggregator;
use crate::crawler::progress::{CrawlProgress, ProgressListener, ProgressSnapshot};
use crate::record::CanonicalRecord;
use crate::source::{ItemId, Source};
use crate::FetchError;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// An item whose primary fetch failed
#[derive(Debug)]
pub struct ItemFailure {
    pub item: ItemId,
    pub cause: FetchError,
}

/// Merged result of one queue run
#[derive(Debug, Default)]
pub struct QueueOutcome {
    /// Records of every item that succeeded
    pub records: Vec<CanonicalRecord>,

    /// Items that were dropped, with their cause
    pub failures: Vec<ItemFailure>,

    /// Final counter values
    pub progress: ProgressSnapshot,

    /// Items never dispatched because the run was cancelled
    pub skipped: usize,
}

enum ItemResult {
    Record(CanonicalRecord),
    Failed(ItemFailure),
    Skipped,
}

/// Fixed-size worker pool over a list of identifiers
pub struct FetchQueue<S> {
    source: Arc<S>,
    aggregator: RecordAggregator<S>,
    workers: usize,
    cancel: CancellationToken,
    listener: Option<ProgressListener>,
}

impl<S: Source> FetchQueue<S> {
    /// Creates a queue with `workers` concurrent item fetches (at least one)
    pub fn new(source: Arc<S>, workers: usize, cancel: CancellationToken) -> Self {
        Self {
            aggregator: RecordAggregator::new(source.clone()),
            source,
            workers: workers.max(1),
            cancel,
            listener: None,
        }
    }

    /// Sets the callback receiving progress snapshots
    pub fn with_listener(mut self, listener: Option<ProgressListener>) -> Self {
        self.listener = listener;
        self
    }

    /// Fetches and aggregates every item
    ///
    /// With a single worker, records come out in submission order. With more
    /// workers the order is unspecified. Once the run is cancelled, items not
    /// yet started are counted as skipped and items in flight are finished.
    pub async fn run(&self, items: Vec<ItemId>) -> QueueOutcome {
        let progress = CrawlProgress::new(items.len(), self.listener.clone());
        tracing::info!(
            "Fetching {} items with {} worker(s)",
            items.len(),
            self.workers
        );

        let results: Vec<ItemResult> = stream::iter(items)
            .map(|item| self.process(item, &progress))
            .buffer_unordered(self.workers)
            .collect()
            .await;

        let mut outcome = QueueOutcome::default();
        for result in results {
            match result {
                ItemResult::Record(record) => outcome.records.push(record),
                ItemResult::Failed(failure) => outcome.failures.push(failure),
                ItemResult::Skipped => outcome.skipped += 1,
            }
        }
        outcome.progress = progress.snapshot();

        if outcome.skipped > 0 {
            tracing::warn!("Run cancelled, {} items were not fetched", outcome.skipped);
        }
        outcome
    }

    async fn process(&self, item: ItemId, progress: &CrawlProgress) -> ItemResult {
        if self.cancel.is_cancelled() {
            return ItemResult::Skipped;
        }

        // Once started, an item runs to completion even if the run is cancelled
        match self.source.fetch_detail(&item).await {
            Ok(detail) => {
                let record = self.aggregator.aggregate(&item, &detail).await;
                progress.advance(true);
                ItemResult::Record(record)
            }
            Err(cause) => {
                tracing::warn!(item = %item, error = %cause, "Item fetch failed, skipping");
                progress.advance(false);
                ItemResult::Failed(ItemFailure { item, cause })
            }
        }
    }
}
