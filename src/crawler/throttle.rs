//! Per-host request throttling
//!
//! Each host gets its own semaphore sized to the configured concurrency
//! ceiling. A request holds its host permit for the whole exchange, and the
//! randomized delay is served while the permit is held, so with a ceiling of
//! one the delay separates consecutive requests to the same host.

use crate::FetchError;
use rand::Rng;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use url::Url;

/// Permit for one in-flight request to a host
#[derive(Debug)]
pub struct HostPermit {
    /// The host this permit belongs to
    pub host: String,

    _permit: OwnedSemaphorePermit,
}

/// Tracks per-host concurrency and serves the inter-request delay
#[derive(Debug)]
pub struct HostThrottle {
    /// Maximum in-flight requests per host
    limit: usize,

    /// Upper bound of the random delay before each request
    max_delay: Duration,

    /// One semaphore per host, created lazily
    hosts: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl HostThrottle {
    /// Creates a new throttle
    ///
    /// # Arguments
    ///
    /// * `limit` - In-flight request ceiling per host (clamped to at least 1)
    /// * `max_delay` - Upper bound of the per-request random delay
    pub fn new(limit: usize, max_delay: Duration) -> Self {
        Self {
            limit: limit.max(1),
            max_delay,
            hosts: Mutex::new(HashMap::new()),
        }
    }

    /// Waits for a free slot on the URL's host, then sleeps the random delay
    ///
    /// The returned permit must be held until the response body has been read.
    pub async fn acquire(&self, url: &Url) -> Result<HostPermit, FetchError> {
        let host = host_key(url)?;
        let semaphore = self.semaphore_for(&host);

        let permit = semaphore
            .acquire_owned()
            .await
            .map_err(|_| FetchError::Cancelled {
                url: url.to_string(),
            })?;

        let delay = self.jitter();
        if !delay.is_zero() {
            tracing::trace!("Delaying request to {} by {:?}", host, delay);
            tokio::time::sleep(delay).await;
        }

        Ok(HostPermit {
            host,
            _permit: permit,
        })
    }

    /// Picks a random delay in `[0, max_delay]`
    pub fn jitter(&self) -> Duration {
        let max_ms = self.max_delay.as_millis() as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
    }

    /// Returns the number of free slots currently available for a host
    pub fn available(&self, host: &str) -> usize {
        self.hosts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(host)
            .map(|s| s.available_permits())
            .unwrap_or(self.limit)
    }

    fn semaphore_for(&self, host: &str) -> Arc<Semaphore> {
        let mut hosts = self.hosts.lock().unwrap_or_else(PoisonError::into_inner);
        hosts
            .entry(host.to_string())
            .or_insert_with(|| Arc::new(Semaphore::new(self.limit)))
            .clone()
    }
}

/// Builds the throttling key (`host:port`) for a URL
pub fn host_key(url: &Url) -> Result<String, FetchError> {
    let host = url
        .host_str()
        .ok_or_else(|| FetchError::InvalidUrl(format!("Missing host in {}", url)))?;

    Ok(match url.port_or_known_default() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}
