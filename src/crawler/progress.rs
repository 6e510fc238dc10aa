//! Completion tracking for the detail-fetch phase

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Point-in-time view of queue progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressSnapshot {
    /// Items finished, successfully or not
    pub completed: usize,

    /// Items that failed and were dropped
    pub failed: usize,

    /// Items submitted to the queue
    pub total: usize,
}

impl ProgressSnapshot {
    /// Completion percentage; an empty queue counts as done
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (self.completed as f64 / self.total as f64) * 100.0
    }

    pub fn is_done(&self) -> bool {
        self.completed >= self.total
    }
}

/// Receives progress snapshots as items complete
pub type ProgressListener = Arc<dyn Fn(ProgressSnapshot) + Send + Sync>;

/// Shared completion counters for one queue run
///
/// Workers only ever increment. Snapshots handed to the listener never go
/// backwards, even when several workers finish at the same time.
pub struct CrawlProgress {
    completed: AtomicUsize,
    failed: AtomicUsize,
    emit: Mutex<()>,
    total: usize,
    listener: Option<ProgressListener>,
}

impl CrawlProgress {
    pub fn new(total: usize, listener: Option<ProgressListener>) -> Self {
        Self {
            completed: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            emit: Mutex::new(()),
            total,
            listener,
        }
    }

    /// Records one finished item and emits the progress signal
    ///
    /// Every call emits exactly once. Counting and emission happen under the
    /// same lock, so successive signals carry strictly increasing counts.
    pub fn advance(&self, succeeded: bool) -> ProgressSnapshot {
        let _emit = self.emit.lock().unwrap_or_else(PoisonError::into_inner);

        if !succeeded {
            self.failed.fetch_add(1, Ordering::SeqCst);
        }
        let completed = self.completed.fetch_add(1, Ordering::SeqCst) + 1;

        let snapshot = ProgressSnapshot {
            completed,
            failed: self.failed.load(Ordering::SeqCst),
            total: self.total,
        };

        tracing::info!(
            completed = snapshot.completed,
            total = snapshot.total,
            failed = snapshot.failed,
            percent = format!("{:.2}", snapshot.percent()),
            "Progress"
        );
        if let Some(listener) = &self.listener {
            listener(snapshot);
        }

        snapshot
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            completed: self.completed.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
            total: self.total,
        }
    }
}
