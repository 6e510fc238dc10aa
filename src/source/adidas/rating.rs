//! Rating auxiliary
//!
//! The review provider answers with a JavaScript payload that embeds the
//! rating summary as an escaped HTML string. The fragment is cut out between
//! two known markers, unescaped, and parsed as HTML. Any failure here only
//! empties the rating fields of the item.

use super::Endpoints;
use crate::crawler::FetchEngine;
use crate::record::{RatingSense, RatingSummary};
use crate::source::{AuxiliaryData, AuxiliaryError, AuxiliaryKey, AuxiliarySource};
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::sync::Arc;

const FRAGMENT_START: &str = r#""BVRRRatingSummarySourceID":""#;
const FRAGMENT_END: &str = r#"","BVRRSecondaryRatingSummarySourceID":""#;

/// Cuts the embedded rating summary out of the provider payload
///
/// Returns `None` when the start marker is absent. A missing end marker
/// keeps everything after the start marker.
pub fn isolate_fragment(body: &str) -> Option<String> {
    let start = body.find(FRAGMENT_START)? + FRAGMENT_START.len();
    let rest = &body[start..];
    let end = rest.find(FRAGMENT_END).unwrap_or(rest.len());

    Some(rest[..end].replace("\\n", "").replace('\\', ""))
}

/// Parses the unescaped rating summary fragment
///
/// # Extraction Rules
///
/// | Field | Selector |
/// |-------|----------|
/// | rating | `span[itemprop=ratingValue]` |
/// | recommend rate | `span.BVRRBuyAgainPercentage span.BVRRNumber` |
/// | senses | `div.BVRRRatingEntry`: header text + radio image `alt` |
///
/// An entry with neither a header nor an image is dropped.
pub fn parse_rating_fragment(fragment: &str) -> Result<RatingSummary, AuxiliaryError> {
    let document = Html::parse_fragment(fragment);

    let rating_sel = selector("span[itemprop=ratingValue]")?;
    let recommend_sel = selector("span.BVRRBuyAgainPercentage span.BVRRNumber")?;
    let entry_sel = selector("div.BVRRRatingEntry")?;
    let header_sel = selector("div.BVRRRatingHeader")?;
    let image_sel = selector("div.BVRRRatingRadioImage img")?;

    let text_of = |sel: &Selector| -> String {
        document
            .select(sel)
            .flat_map(|e| e.text())
            .collect::<String>()
            .trim()
            .to_string()
    };

    let rating = text_of(&rating_sel);
    let recommended_rate = text_of(&recommend_sel);

    let senses = document
        .select(&entry_sel)
        .filter_map(|entry| {
            let kind = entry
                .select(&header_sel)
                .flat_map(|e| e.text())
                .collect::<String>()
                .trim()
                .to_string();
            let value = entry
                .select(&image_sel)
                .next()
                .and_then(|img| img.value().attr("alt"))
                .unwrap_or("N/A")
                .trim()
                .to_string();

            if kind.is_empty() && value == "N/A" {
                None
            } else {
                Some(RatingSense { kind, value })
            }
        })
        .collect();

    Ok(RatingSummary {
        rating,
        recommended_rate,
        senses,
    })
}

fn selector(css: &str) -> Result<Selector, AuxiliaryError> {
    Selector::parse(css).map_err(|e| AuxiliaryError::Extraction {
        kind: "rating",
        message: format!("bad selector '{}': {:?}", css, e),
    })
}

/// Fetches rating data keyed by (model, article)
pub struct RatingSource {
    engine: Arc<FetchEngine>,
    endpoints: Arc<Endpoints>,
}

impl RatingSource {
    pub fn new(engine: Arc<FetchEngine>, endpoints: Arc<Endpoints>) -> Self {
        Self { engine, endpoints }
    }
}

#[async_trait]
impl AuxiliarySource for RatingSource {
    fn name(&self) -> &'static str {
        "rating"
    }

    async fn fetch(&self, key: &AuxiliaryKey) -> Result<AuxiliaryData, AuxiliaryError> {
        let url = self.endpoints.rating(&key.model_key, &key.item_key);
        let body = self.engine.get_text(&url).await?;

        let fragment = isolate_fragment(&body).ok_or_else(|| AuxiliaryError::Extraction {
            kind: "rating",
            message: format!("summary markers not found in {}", url),
        })?;
        let summary = parse_rating_fragment(&fragment)?;

        if summary.is_empty() {
            return Err(AuxiliaryError::Missing {
                kind: "rating",
                key: format!("{}/{}", key.model_key, key.item_key),
            });
        }

        Ok(AuxiliaryData::Rating(summary))
    }
}
