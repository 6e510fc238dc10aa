use serde::Deserialize;

/// Main configuration structure for Sku-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawl orchestration knobs
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CrawlerConfig {
    /// Maximum number of items a run produces (0 = unbounded)
    pub item_limit: usize,

    /// Number of concurrent detail-fetch workers
    pub workers: usize,

    /// Upper bound of the random delay applied before each request (milliseconds)
    pub max_delay_ms: u64,

    /// Maximum number of in-flight requests per host
    pub per_host_concurrency: usize,

    /// Whole-request timeout (seconds)
    pub request_timeout_secs: u64,

    /// Transport-level retries for transient failures
    pub max_retries: u32,

    /// Base backoff between retries, multiplied by the attempt number (milliseconds)
    pub retry_backoff_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            item_limit: 200,
            workers: 1,
            max_delay_ms: 5000,
            per_host_concurrency: 1,
            request_timeout_secs: 30,
            max_retries: 2,
            retry_backoff_ms: 1000,
        }
    }
}

/// Client identities rotated across requests
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Pool of user agent strings; one is picked at random per request
    pub pool: Vec<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            pool: [
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/128.0.0.0 Safari/537.36",
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/70.0.3538.77 Safari/537.36",
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/71.0.3578.98 Safari/537.36",
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_14_5) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/12.1.1 Safari/605.1.15",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

/// Which catalog implementation to crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Adidas,
}

/// Catalog endpoint configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SourceConfig {
    /// Catalog implementation
    pub kind: SourceKind,

    /// Storefront base URL (listing, detail and size-chart APIs live here)
    pub base_url: String,

    /// Review provider base URL
    pub review_base_url: String,

    /// Listing category filter
    pub category: String,

    /// Listing gender filter
    pub gender: String,

    /// Items per listing page
    pub page_size: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Adidas,
            base_url: "https://shop.adidas.jp".to_string(),
            review_base_url: "https://adidasjp.ugc.bazaarvoice.com".to_string(),
            category: "wear".to_string(),
            gender: "mens".to_string(),
            page_size: 120,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct OutputConfig {
    /// Path of the flattened CSV export
    pub csv_path: String,

    /// Path of the JSON document export
    pub json_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: "products.csv".to_string(),
            json_path: "products.json".to_string(),
        }
    }
}
