//! Output module for persisting records and reporting on runs
//!
//! This module handles:
//! - Exporting records as flat CSV and nested JSON
//! - Summarizing a finished run

mod csv_output;
mod json_output;
pub mod report;
mod traits;

pub use csv_output::{CsvSink, RecordRow};
pub use json_output::JsonSink;
pub use report::{print_report, CrawlReport};
pub use traits::{OutputError, OutputResult, OutputSink};

use crate::config::OutputConfig;
use crate::record::CanonicalRecord;

/// Writes the records to every configured sink
///
/// # Arguments
///
/// * `config` - Output paths
/// * `records` - The records of a finished run
///
/// # Returns
///
/// * `Ok(())` - All sinks were written
/// * `Err(OutputError)` - The first sink that failed
pub fn write_outputs(config: &OutputConfig, records: &[CanonicalRecord]) -> OutputResult<()> {
    let sinks: Vec<Box<dyn OutputSink>> = vec![
        Box::new(CsvSink::new(&config.csv_path)),
        Box::new(JsonSink::new(&config.json_path)),
    ];

    for sink in &sinks {
        tracing::debug!("Writing {} output", sink.name());
        sink.write(records)?;
    }
    Ok(())
}
