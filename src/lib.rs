//! Sku-Harvest: a polite product catalog harvester
//!
//! This crate walks a paginated e-commerce catalog, fetches every listed
//! item's detail payload through a bounded worker queue, merges auxiliary
//! size-chart and rating data into each item, and emits one store-agnostic
//! record per item.

pub mod config;
pub mod crawler;
pub mod output;
pub mod record;
pub mod source;

use thiserror::Error;

/// Main error type for Sku-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Listing discovery failed on page {page}: {source}")]
    Discovery { page: u32, source: FetchError },

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Crawl cancelled during {phase}")]
    Cancelled { phase: &'static str },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors produced by the fetch engine
///
/// Transport and decode failures share this type so that callers can treat
/// them identically at whichever phase they occur.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP client error: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request to {url} was cancelled")]
    Cancelled { url: String },
}

impl FetchError {
    /// Classifies a reqwest error raised while sending a request
    pub fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else if error.is_connect() {
            FetchError::Connect {
                url: url.to_string(),
                message: error.to_string(),
            }
        } else {
            FetchError::Http {
                url: url.to_string(),
                source: error,
            }
        }
    }

    /// Whether a retry of the same request could plausibly succeed
    ///
    /// Timeouts, connection failures, HTTP 429 and HTTP 5xx are transient.
    /// Everything else (4xx, decode errors, bad URLs) is final.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Timeout { .. } | FetchError::Connect { .. } => true,
            FetchError::Status { status, .. } => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }
}

/// Result type alias for Sku-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for fetch operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, Coordinator, CrawlOutcome, FetchEngine};
pub use record::CanonicalRecord;
pub use source::{AuxiliaryKey, ItemId, ListingPage, Source};
