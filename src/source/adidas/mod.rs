//! Adidas storefront catalog
//!
//! Listing and detail data come from the storefront's JSON APIs, size charts
//! from a per-model JSON endpoint, and ratings from the review provider's
//! embedded-HTML widget.

mod detail;
mod listing;
mod rating;
mod size_chart;

pub use detail::ProductResponse;
pub use listing::ProductListResponse;
pub use rating::{isolate_fragment, parse_rating_fragment, RatingSource};
pub use size_chart::{SizeChartResponse, SizeChartSource};

use crate::config::SourceConfig;
use crate::crawler::FetchEngine;
use crate::record::CanonicalRecord;
use crate::source::{AuxiliaryKey, AuxiliarySource, ItemId, ListingPage, Source};
use crate::{ConfigError, FetchError};
use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

/// URL builder for every endpoint the catalog uses
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: Url,
    review_base: Url,
    category: String,
    gender: String,
    page_size: u32,
}

impl Endpoints {
    pub fn from_config(config: &SourceConfig) -> Result<Self, ConfigError> {
        let parse = |field: &str, value: &str| {
            Url::parse(value)
                .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))
        };

        Ok(Self {
            base: parse("base_url", &config.base_url)?,
            review_base: parse("review_base_url", &config.review_base_url)?,
            category: config.category.clone(),
            gender: config.gender.clone(),
            page_size: config.page_size,
        })
    }

    /// Listing API for a 1-based page number
    pub fn listing(&self, page: u32) -> Url {
        let mut url = with_path(&self.base, "/f/v1/pub/product/list");
        url.query_pairs_mut()
            .append_pair("category", &self.category)
            .append_pair("gender", &self.gender)
            .append_pair("limit", &self.page_size.to_string())
            .append_pair("order", "10")
            .append_pair("page", &page.to_string());
        url
    }

    /// Detail API for an article code
    pub fn detail(&self, article: &str) -> Url {
        with_path(
            &self.base,
            &format!("/f/v2/web/pub/products/article/{}/", article),
        )
    }

    /// Size chart API for a model code
    pub fn size_chart(&self, model: &str) -> Url {
        with_path(&self.base, &format!("/f/v1/pub/size_chart/{}", model))
    }

    /// Review widget for a (model, article) pair
    pub fn rating(&self, model: &str, article: &str) -> Url {
        let mut url = with_path(
            &self.review_base,
            &format!("/7896-ja_jp/{}/reviews.djs", model),
        );
        url.query_pairs_mut()
            .append_pair("format", "embeddedhtml")
            .append_pair("productattribute_itemKcod", article);
        url
    }

    /// Public product page for an article code
    pub fn product_page(&self, article: &str) -> String {
        with_path(&self.base, &format!("/products/{}", article)).to_string()
    }

    /// Resolves a storefront-relative path (images, category links)
    pub fn absolute(&self, path: &str) -> String {
        if path.is_empty() || path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}{}", self.base.as_str().trim_end_matches('/'), path)
    }
}

/// Replaces the path of `base` while keeping any path prefix it already has
fn with_path(base: &Url, path: &str) -> Url {
    let mut url = base.clone();
    let prefix = base.path().trim_end_matches('/');
    url.set_path(&format!("{}{}", prefix, path));
    url.set_query(None);
    url
}

/// The storefront catalog
pub struct AdidasSource {
    engine: Arc<FetchEngine>,
    endpoints: Arc<Endpoints>,
    auxiliaries: Vec<Arc<dyn AuxiliarySource>>,
}

impl AdidasSource {
    /// Creates the source with its size-chart and rating auxiliaries
    ///
    /// All fetches, auxiliary ones included, go through the same engine and
    /// therefore share its per-host limits.
    pub fn new(engine: Arc<FetchEngine>, config: &SourceConfig) -> Result<Self, ConfigError> {
        let endpoints = Arc::new(Endpoints::from_config(config)?);
        let auxiliaries: Vec<Arc<dyn AuxiliarySource>> = vec![
            Arc::new(SizeChartSource::new(engine.clone(), endpoints.clone())),
            Arc::new(RatingSource::new(engine.clone(), endpoints.clone())),
        ];

        Ok(Self {
            engine,
            endpoints,
            auxiliaries,
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }
}

#[async_trait]
impl Source for AdidasSource {
    type Detail = ProductResponse;

    fn name(&self) -> &str {
        "adidas"
    }

    async fn fetch_listing_page(&self, page: u32) -> Result<ListingPage, FetchError> {
        let url = self.endpoints.listing(page);
        let response: ProductListResponse = self.engine.get_json(&url).await?;
        Ok(response.into_listing_page(&self.endpoints))
    }

    async fn fetch_detail(&self, item: &ItemId) -> Result<ProductResponse, FetchError> {
        let url = Url::parse(item.as_str())
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", item, e)))?;
        self.engine.get_json(&url).await
    }

    fn to_record(&self, _item: &ItemId, detail: &ProductResponse) -> CanonicalRecord {
        detail.to_record(&self.endpoints)
    }

    fn auxiliary_key(&self, detail: &ProductResponse) -> Option<AuxiliaryKey> {
        detail.auxiliary_key()
    }

    fn auxiliaries(&self) -> &[Arc<dyn AuxiliarySource>] {
        &self.auxiliaries
    }
}

/// Entries of a JSON object keyed by stringified indexes, in index order
///
/// The storefront encodes tables as `{"0": .., "1": ..}` and sends `[]` when
/// a table is empty; both shapes (and `null`) are accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct Indexed<T>(pub Vec<(String, T)>);

impl<T> Default for Indexed<T> {
    fn default() -> Self {
        Indexed(Vec::new())
    }
}

impl<T> Indexed<T> {
    pub fn get(&self, key: &str) -> Option<&T> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, T)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Indexed<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Shape<T> {
            Map(HashMap<String, T>),
            Seq(Vec<T>),
        }

        let mut entries: Vec<(String, T)> = match Option::<Shape<T>>::deserialize(deserializer)? {
            Some(Shape::Map(map)) => map.into_iter().collect(),
            Some(Shape::Seq(seq)) => seq
                .into_iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
            None => Vec::new(),
        };
        entries.sort_by(|a, b| index_order(&a.0, &b.0));

        Ok(Indexed(entries))
    }
}

/// Numeric keys first in numeric order, then everything else lexically
fn index_order(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}
