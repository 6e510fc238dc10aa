//! Record aggregation
//!
//! Builds one [`CanonicalRecord`] from an item's primary detail payload and
//! completes it with every auxiliary fetch the source declares. Auxiliary
//! failures never fail the item; the affected fields simply stay empty.

use crate::record::CanonicalRecord;
use crate::source::{AuxiliaryError, ItemId, Source};
use futures::future::join_all;
use std::sync::Arc;

/// Stateless record builder for one source
pub struct RecordAggregator<S> {
    source: Arc<S>,
}

impl<S> Clone for RecordAggregator<S> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
        }
    }
}

impl<S: Source> RecordAggregator<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self { source }
    }

    /// Maps the primary payload and merges all auxiliary data into it
    ///
    /// Auxiliary keys are taken from the fetched payload, never from the
    /// listing. All auxiliaries run concurrently; each one that succeeds
    /// replaces its fields wholesale.
    pub async fn aggregate(&self, item: &ItemId, detail: &S::Detail) -> CanonicalRecord {
        let mut record = self.source.to_record(item, detail);

        let Some(key) = self.source.auxiliary_key(detail) else {
            tracing::debug!(item = %item, "No auxiliary key in detail payload");
            return record;
        };

        let auxiliaries = self.source.auxiliaries();
        let results = join_all(auxiliaries.iter().map(|auxiliary| auxiliary.fetch(&key))).await;

        for (auxiliary, result) in auxiliaries.iter().zip(results) {
            match result {
                Ok(data) => data.merge_into(&mut record),
                Err(AuxiliaryError::Missing { .. }) => {
                    tracing::debug!(item = %item, "No {} data", auxiliary.name());
                }
                Err(error) => {
                    tracing::warn!(
                        item = %item,
                        error = %error,
                        "{} fetch failed, leaving fields empty",
                        auxiliary.name()
                    );
                }
            }
        }

        record
    }
}
