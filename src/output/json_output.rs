//! JSON export of the full nested records

use super::traits::{OutputResult, OutputSink};
use crate::record::CanonicalRecord;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Writes records as a pretty-printed JSON array
pub struct JsonSink {
    path: PathBuf,
}

impl JsonSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl OutputSink for JsonSink {
    fn name(&self) -> &str {
        "json"
    }

    fn write(&self, records: &[CanonicalRecord]) -> OutputResult<()> {
        let mut writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(&mut writer, records)?;
        writer.flush()?;

        tracing::info!("Wrote {} records to {}", records.len(), self.path.display());
        Ok(())
    }
}
