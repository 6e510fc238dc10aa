//! Paginated listing discovery
//!
//! Walks the catalog listing one page at a time, starting at page 1, and
//! accumulates item identifiers until the server reports the last page or
//! the item limit is reached.

use crate::source::{ItemId, Source};
use crate::HarvestError;
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Sequential walker over a source's listing pages
pub struct DiscoveryWalker<S> {
    source: Arc<S>,
    limit: usize,
    cancel: CancellationToken,
}

impl<S: Source> DiscoveryWalker<S> {
    /// Creates a walker
    ///
    /// # Arguments
    ///
    /// * `source` - The catalog to walk
    /// * `limit` - Maximum number of identifiers to return, 0 for no limit
    /// * `cancel` - Token checked before and during every page fetch
    pub fn new(source: Arc<S>, limit: usize, cancel: CancellationToken) -> Self {
        Self {
            source,
            limit,
            cancel,
        }
    }

    /// Collects the identifiers of the catalog in listing order
    ///
    /// Pages are fetched strictly one after another. Page `k + 1` is only
    /// requested when the server reported page `k` as not being the last one
    /// and the limit has not been reached yet. The result is truncated to the
    /// limit, so the last page may be cut partway.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ItemId>)` - Unique identifiers in first-seen order
    /// * `Err(HarvestError::Discovery)` - A listing page could not be fetched
    /// * `Err(HarvestError::Cancelled)` - The run was cancelled
    pub async fn walk(&self) -> Result<Vec<ItemId>, HarvestError> {
        let mut seen = HashSet::new();
        let mut items = Vec::new();
        let mut requested = 1u32;

        loop {
            if self.cancel.is_cancelled() {
                return Err(HarvestError::Cancelled { phase: "discovery" });
            }

            tracing::debug!(page = requested, "Fetching listing page");
            let page = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    return Err(HarvestError::Cancelled { phase: "discovery" });
                }
                result = self.source.fetch_listing_page(requested) => {
                    result.map_err(|source| HarvestError::Discovery {
                        page: requested,
                        source,
                    })?
                }
            };

            let listed = page.items.len();
            for item in page.items {
                if seen.insert(item.clone()) {
                    items.push(item);
                }
            }

            // A stale or unreadable page number must not send the walk backwards
            let current = page.current_page.max(requested);
            tracing::info!(
                "Listing page {}/{}: {} items ({} unique so far)",
                current,
                page.total_pages,
                listed,
                items.len()
            );

            if current >= page.total_pages {
                break;
            }
            if self.limit != 0 && items.len() >= self.limit {
                tracing::debug!("Item limit {} reached on page {}", self.limit, current);
                break;
            }
            requested = current + 1;
        }

        if self.limit != 0 {
            items.truncate(self.limit);
        }
        Ok(items)
    }
}
