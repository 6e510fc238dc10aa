//! Canonical, store-agnostic product record
//!
//! Every catalog adapter maps its payloads into these types. Collections are
//! always present; a source that yields nothing for a field leaves it empty.

use serde::{Deserialize, Serialize};

/// Fully aggregated output unit for one catalog item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub name: String,
    pub model_code: String,
    pub article_code: String,
    pub price: Price,
    pub url: String,
    pub images: Vec<String>,
    pub breadcrumb: String,
    pub breadcrumbs: Vec<Breadcrumb>,
    pub kws: String,
    pub categories: Vec<Category>,
    pub size_choice: SizeChoice,
    pub coordinates: Vec<Coordinate>,
    pub description: Description,
    pub skus: Vec<Sku>,
    pub size_charts: Vec<SizeChart>,
    pub technologies: Vec<Technology>,
    pub review_count: String,
    pub reviews: Vec<Review>,
    pub rating: String,
    pub recommended_rate: String,
    pub rating_senses: Vec<RatingSense>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub with_tax: String,
    pub without_tax: String,
    pub discount_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Breadcrumb {
    pub label: String,
    pub search_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub label: String,
    pub link: String,
}

/// Sizes currently purchasable online plus the reviewers' fit score
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SizeChoice {
    pub available_size: String,
    pub sense_of_the_size: String,
}

/// A related item suggested alongside the product
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub product_name: String,
    pub product_url: String,
    pub product_image: String,
    pub product_price: Price,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Description {
    pub title: String,
    pub general: String,
    pub breads: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkuStatus {
    pub is_stock: bool,
    pub is_stock_store: bool,
    pub is_sold_out: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sku {
    pub size_name: String,
    pub code: String,
    pub status: SkuStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

/// One row of a size chart: a size label and its measurements
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SizeChart {
    pub size: String,
    pub measurements: Vec<Measurement>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Technology {
    pub name: String,
    pub desc: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub author_name: String,
    pub date_published: String,
    pub body: String,
    pub best_rating: String,
    pub rating_value: String,
}

/// A single rated aspect from the review provider (e.g. fit, comfort)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingSense {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

/// Rating data delivered by the review provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub rating: String,
    pub recommended_rate: String,
    pub senses: Vec<RatingSense>,
}

impl RatingSummary {
    /// True when the widget carried no score, recommendation or sense
    pub fn is_empty(&self) -> bool {
        self.rating.is_empty() && self.recommended_rate.is_empty() && self.senses.is_empty()
    }
}

impl CanonicalRecord {
    /// Replaces the size-chart fields wholesale
    pub fn merge_size_charts(&mut self, charts: Vec<SizeChart>) {
        self.size_charts = charts;
    }

    /// Replaces the rating fields wholesale
    pub fn merge_rating(&mut self, summary: RatingSummary) {
        self.rating = summary.rating;
        self.recommended_rate = summary.recommended_rate;
        self.rating_senses = summary.senses;
    }
}
