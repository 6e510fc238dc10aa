//! HTTP fetch engine
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client from the crawler configuration
//! - Per-host concurrency limits and randomized inter-request delay
//! - A per-request hook for transport metadata (rotating user agent)
//! - Retry logic for transient failures
//! - Error classification and JSON decoding

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::crawler::throttle::HostThrottle;
use crate::FetchError;
use rand::seq::SliceRandom;
use reqwest::header::USER_AGENT;
use reqwest::{redirect::Policy, Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Adjusts a request before it is sent
///
/// Implementations set transport-level metadata such as the client identity.
pub trait RequestHook: Send + Sync {
    fn prepare(&self, request: RequestBuilder) -> RequestBuilder;
}

/// Picks a random user agent from a fixed pool for every request
#[derive(Debug, Clone)]
pub struct RotatingUserAgent {
    agents: Vec<String>,
}

impl RotatingUserAgent {
    pub fn new(agents: Vec<String>) -> Self {
        Self { agents }
    }

    /// Returns one agent from the pool, or `None` if the pool is empty
    pub fn pick(&self) -> Option<&str> {
        self.agents
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
    }
}

impl RequestHook for RotatingUserAgent {
    fn prepare(&self, request: RequestBuilder) -> RequestBuilder {
        match self.pick() {
            Some(agent) => request.header(USER_AGENT, agent),
            None => request,
        }
    }
}

/// Retry policy for transient transport failures
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,

    /// Backoff base; attempt `n` waits `n * backoff`
    pub backoff: Duration,
}

/// Rate-limited HTTP fetch engine shared by the listing, detail and auxiliary fetches
pub struct FetchEngine {
    client: Client,
    throttle: HostThrottle,
    hook: Arc<dyn RequestHook>,
    retry: RetryPolicy,
}

impl FetchEngine {
    /// Builds an engine from crawler and user agent configuration
    ///
    /// # Returns
    ///
    /// * `Ok(FetchEngine)` - Successfully built engine
    /// * `Err(FetchError::Client)` - The HTTP client could not be built
    pub fn new(crawler: &CrawlerConfig, agents: &UserAgentConfig) -> Result<Self, FetchError> {
        let client = build_http_client(crawler).map_err(FetchError::Client)?;

        Ok(Self {
            client,
            throttle: HostThrottle::new(
                crawler.per_host_concurrency,
                Duration::from_millis(crawler.max_delay_ms),
            ),
            hook: Arc::new(RotatingUserAgent::new(agents.pool.clone())),
            retry: RetryPolicy {
                max_retries: crawler.max_retries,
                backoff: Duration::from_millis(crawler.retry_backoff_ms),
            },
        })
    }

    /// Replaces the per-request hook
    pub fn with_hook(mut self, hook: Arc<dyn RequestHook>) -> Self {
        self.hook = hook;
        self
    }

    /// Returns the engine's per-host throttle
    pub fn throttle(&self) -> &HostThrottle {
        &self.throttle
    }

    /// Fetches a URL and returns the response body as text
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 2xx | Return body |
    /// | HTTP 429 / 5xx | Retry up to `max_retries`, linear backoff |
    /// | Timeout / connection failure | Retry up to `max_retries`, linear backoff |
    /// | Any other status | Immediate error |
    pub async fn get_text(&self, url: &Url) -> Result<String, FetchError> {
        let mut attempt = 0;

        loop {
            match self.send_once(url).await {
                Ok(body) => return Ok(body),
                Err(err) if err.is_transient() && attempt < self.retry.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        url = %url,
                        attempt,
                        error = %err,
                        "Transient fetch failure, retrying"
                    );
                    tokio::time::sleep(self.retry.backoff * attempt).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Fetches a URL and decodes the body as JSON
    pub async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, FetchError> {
        let body = self.get_text(url).await?;
        serde_json::from_str(&body).map_err(|e| FetchError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    /// Sends one request under the host throttle
    async fn send_once(&self, url: &Url) -> Result<String, FetchError> {
        let _permit = self.throttle.acquire(url).await?;
        tracing::debug!("Fetching {}", url);

        let request = self.hook.prepare(self.client.get(url.clone()));
        let response = request
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url.as_str(), e))
    }
}

/// Builds an HTTP client with the configured timeouts
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}
