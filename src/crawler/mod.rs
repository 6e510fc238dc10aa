//! Crawl orchestration core
//!
//! This module contains the source-independent crawling logic:
//! - Rate-limited HTTP fetching with retry logic
//! - Paginated listing discovery
//! - A bounded worker queue for item detail fetches
//! - Record aggregation with auxiliary fetches
//! - Overall crawl coordination

mod aggregator;
mod coordinator;
mod discovery;
mod fetcher;
mod progress;
mod queue;
mod throttle;

#[cfg(test)]
pub(crate) mod testing;

pub use aggregator::RecordAggregator;
pub use coordinator::{run_crawl, Coordinator, CrawlOutcome};
pub use discovery::DiscoveryWalker;
pub use fetcher::{build_http_client, FetchEngine, RequestHook, RetryPolicy, RotatingUserAgent};
pub use progress::{CrawlProgress, ProgressListener, ProgressSnapshot};
pub use queue::{FetchQueue, ItemFailure, QueueOutcome};
pub use throttle::{host_key, HostPermit, HostThrottle};
