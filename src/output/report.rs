//! Run report
//!
//! Summarizes a finished crawl and prints it to stdout.

use crate::crawler::CrawlOutcome;
use chrono::{DateTime, Utc};

/// Summary statistics for one run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub source: String,
    pub config_hash: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Identifiers returned by discovery
    pub discovered: usize,

    /// Records produced
    pub produced: usize,

    /// Items dropped after a failed fetch
    pub failed: usize,

    /// Items not fetched because the run was cancelled
    pub skipped: usize,

    /// (item, cause) of each dropped item
    pub failures: Vec<(String, String)>,
}

impl CrawlReport {
    pub fn from_outcome(outcome: &CrawlOutcome, config_hash: &str) -> Self {
        Self {
            source: outcome.source.clone(),
            config_hash: config_hash.to_string(),
            started_at: outcome.started_at,
            finished_at: outcome.finished_at,
            discovered: outcome.discovered,
            produced: outcome.records.len(),
            failed: outcome.failures.len(),
            skipped: outcome.skipped,
            failures: outcome
                .failures
                .iter()
                .map(|f| (f.item.to_string(), f.cause.to_string()))
                .collect(),
        }
    }

    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }

    /// Share of discovered items that produced a record
    pub fn success_rate(&self) -> f64 {
        if self.discovered == 0 {
            return 0.0;
        }
        (self.produced as f64 / self.discovered as f64) * 100.0
    }
}

/// Prints a report to stdout in a formatted manner
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Report ===\n");

    println!("Run:");
    println!("  Source: {}", report.source);
    println!("  Config hash: {}", report.config_hash);
    println!("  Started: {}", report.started_at.to_rfc3339());
    println!("  Finished: {}", report.finished_at.to_rfc3339());
    println!("  Duration: {}s", report.duration_seconds());
    println!();

    println!("Items:");
    println!("  Discovered: {}", report.discovered);
    println!("  Produced: {}", report.produced);
    println!("  Failed: {}", report.failed);
    if report.skipped > 0 {
        println!("  Skipped (cancelled): {}", report.skipped);
    }
    println!();

    if !report.failures.is_empty() {
        println!("Failures ({}):", report.failures.len());
        for (item, cause) in &report.failures {
            println!("  - {}: {}", item, cause);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} items)",
        report.success_rate(),
        report.produced,
        report.discovered
    );
}
