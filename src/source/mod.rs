//! Catalog source capabilities
//!
//! The orchestration core only talks to a catalog through the [`Source`]
//! trait: fetch one listing page, fetch one item's detail payload, map it to
//! a [`CanonicalRecord`], and name the auxiliary fetches that complete it.
//! Adding a catalog means adding one implementation; the core is untouched.

pub mod adidas;

use crate::record::{CanonicalRecord, RatingSummary, SizeChart};
use crate::FetchError;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub use adidas::AdidasSource;

/// Opaque identifier addressing one item's detail endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One fetched page of the catalog listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPage {
    /// Item identifiers in page order
    pub items: Vec<ItemId>,

    /// Page number as reported by the server (0 if it could not be read)
    pub current_page: u32,

    /// Total number of pages as reported by the server
    pub total_pages: u32,
}

/// Keys extracted from a detail payload that address its auxiliary data
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AuxiliaryKey {
    /// Model-level key, shared by every colorway of a product
    pub model_key: String,

    /// Item-level key for this specific article
    pub item_key: String,
}

/// Data produced by one auxiliary fetch
#[derive(Debug, Clone, PartialEq)]
pub enum AuxiliaryData {
    SizeCharts(Vec<SizeChart>),
    Rating(RatingSummary),
}

impl AuxiliaryData {
    /// Merges the data into a record, replacing the affected fields wholesale
    pub fn merge_into(self, record: &mut CanonicalRecord) {
        match self {
            AuxiliaryData::SizeCharts(charts) => record.merge_size_charts(charts),
            AuxiliaryData::Rating(summary) => record.merge_rating(summary),
        }
    }
}

/// Auxiliary fetch failures
///
/// None of these are fatal for the item; they only leave the auxiliary
/// fields empty.
#[derive(Debug, Error)]
pub enum AuxiliaryError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("No {kind} data for {key}")]
    Missing { kind: &'static str, key: String },

    #[error("Failed to extract {kind} data: {message}")]
    Extraction { kind: &'static str, message: String },
}

/// A secondary, keyed request merged into a primary record
#[async_trait]
pub trait AuxiliarySource: Send + Sync {
    /// Short name used in diagnostics
    fn name(&self) -> &'static str;

    async fn fetch(&self, key: &AuxiliaryKey) -> Result<AuxiliaryData, AuxiliaryError>;
}

/// A catalog the orchestration core can crawl
#[async_trait]
pub trait Source: Send + Sync {
    /// Decoded primary payload for one item
    type Detail: Send + Sync;

    /// Short name used in diagnostics and reports
    fn name(&self) -> &str;

    /// Fetches one listing page (1-based)
    async fn fetch_listing_page(&self, page: u32) -> Result<ListingPage, FetchError>;

    /// Fetches one item's primary detail payload
    async fn fetch_detail(&self, item: &ItemId) -> Result<Self::Detail, FetchError>;

    /// Maps the primary payload to the canonical record's primary fields
    fn to_record(&self, item: &ItemId, detail: &Self::Detail) -> CanonicalRecord;

    /// Extracts the keys used to address auxiliary data, if the payload has them
    fn auxiliary_key(&self, detail: &Self::Detail) -> Option<AuxiliaryKey>;

    /// Auxiliary fetches to run for every item
    fn auxiliaries(&self) -> &[Arc<dyn AuxiliarySource>];
}
