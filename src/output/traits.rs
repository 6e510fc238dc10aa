//! Output sink trait and errors

use crate::record::CanonicalRecord;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for the records of a finished run
pub trait OutputSink {
    /// Short name used in log messages
    fn name(&self) -> &str;

    /// Writes every record, replacing any previous content
    ///
    /// # Arguments
    ///
    /// * `records` - The records to write, in output order
    fn write(&self, records: &[CanonicalRecord]) -> OutputResult<()>;
}
