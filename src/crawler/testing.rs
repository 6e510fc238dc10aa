//! In-memory catalog used by the orchestration unit tests

use crate::record::{CanonicalRecord, RatingSummary, SizeChart};
use crate::source::{
    AuxiliaryData, AuxiliaryError, AuxiliaryKey, AuxiliarySource, ItemId, ListingPage, Source,
};
use crate::FetchError;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Catalog whose pages and failures are fixed up front
pub struct MockSource {
    pages: Vec<ListingPage>,
    failing_pages: HashSet<u32>,
    failing_items: HashSet<String>,
    auxiliaries: Vec<Arc<dyn AuxiliarySource>>,
    detail_delay: Duration,
    requested_pages: Mutex<Vec<u32>>,
    requested_items: Mutex<Vec<String>>,
}

impl MockSource {
    /// `pages` pages of `per_page` items each, named `item-<n>` from 1
    pub fn uniform(pages: u32, per_page: usize) -> Self {
        let listing = (1..=pages)
            .map(|page| ListingPage {
                items: (0..per_page)
                    .map(|i| ItemId::new(format!("item-{}", (page as usize - 1) * per_page + i + 1)))
                    .collect(),
                current_page: page,
                total_pages: pages,
            })
            .collect();
        Self::with_pages(listing)
    }

    pub fn with_pages(pages: Vec<ListingPage>) -> Self {
        Self {
            pages,
            failing_pages: HashSet::new(),
            failing_items: HashSet::new(),
            auxiliaries: Vec::new(),
            detail_delay: Duration::ZERO,
            requested_pages: Mutex::new(Vec::new()),
            requested_items: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_page(mut self, page: u32) -> Self {
        self.failing_pages.insert(page);
        self
    }

    pub fn fail_item(mut self, item: &str) -> Self {
        self.failing_items.insert(item.to_string());
        self
    }

    pub fn with_detail_delay(mut self, delay: Duration) -> Self {
        self.detail_delay = delay;
        self
    }

    pub fn with_auxiliary(mut self, auxiliary: MockAuxiliary) -> Self {
        self.auxiliaries.push(Arc::new(auxiliary));
        self
    }

    pub fn requested_pages(&self) -> Vec<u32> {
        self.requested_pages.lock().unwrap().clone()
    }

    pub fn requested_items(&self) -> Vec<String> {
        self.requested_items.lock().unwrap().clone()
    }
}

#[async_trait]
impl Source for MockSource {
    type Detail = String;

    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_listing_page(&self, page: u32) -> Result<ListingPage, FetchError> {
        self.requested_pages.lock().unwrap().push(page);
        if self.failing_pages.contains(&page) {
            return Err(FetchError::Status {
                url: format!("mock://listing/{}", page),
                status: 503,
            });
        }

        Ok(self
            .pages
            .get(page as usize - 1)
            .cloned()
            .unwrap_or(ListingPage {
                items: Vec::new(),
                current_page: page,
                total_pages: self.pages.len() as u32,
            }))
    }

    async fn fetch_detail(&self, item: &ItemId) -> Result<String, FetchError> {
        self.requested_items.lock().unwrap().push(item.to_string());
        if self.detail_delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.detail_delay).await;
        }

        if self.failing_items.contains(item.as_str()) {
            return Err(FetchError::Status {
                url: item.to_string(),
                status: 500,
            });
        }
        Ok(format!("Product {}", item))
    }

    fn to_record(&self, item: &ItemId, detail: &String) -> CanonicalRecord {
        CanonicalRecord {
            name: detail.clone(),
            article_code: item.to_string(),
            model_code: format!("model-{}", item),
            url: item.to_string(),
            ..Default::default()
        }
    }

    fn auxiliary_key(&self, detail: &String) -> Option<AuxiliaryKey> {
        let article = detail.strip_prefix("Product ")?;
        Some(AuxiliaryKey {
            model_key: format!("model-{}", article),
            item_key: article.to_string(),
        })
    }

    fn auxiliaries(&self) -> &[Arc<dyn AuxiliarySource>] {
        &self.auxiliaries
    }
}

/// Auxiliary with a fixed answer
pub enum MockAuxiliary {
    SizeCharts(Vec<SizeChart>),
    Rating(RatingSummary),
    Missing,
    Failing,
}

#[async_trait]
impl AuxiliarySource for MockAuxiliary {
    fn name(&self) -> &'static str {
        match self {
            MockAuxiliary::Rating(_) => "rating",
            _ => "size chart",
        }
    }

    async fn fetch(&self, key: &AuxiliaryKey) -> Result<AuxiliaryData, AuxiliaryError> {
        match self {
            MockAuxiliary::SizeCharts(charts) => Ok(AuxiliaryData::SizeCharts(charts.clone())),
            MockAuxiliary::Rating(summary) => Ok(AuxiliaryData::Rating(summary.clone())),
            MockAuxiliary::Missing => Err(AuxiliaryError::Missing {
                kind: self.name(),
                key: key.model_key.clone(),
            }),
            MockAuxiliary::Failing => Err(AuxiliaryError::Fetch(FetchError::Status {
                url: format!("mock://aux/{}", key.model_key),
                status: 502,
            })),
        }
    }
}
