//! Listing API payload

use super::Endpoints;
use crate::source::{ItemId, ListingPage};
use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;

/// Response of the product listing API
#[derive(Debug, Default, Deserialize)]
pub struct ProductListResponse {
    #[serde(default, deserialize_with = "articles_in_payload_order")]
    pub articles: Vec<ListedArticle>,

    #[serde(default)]
    pub search_options: SearchOptions,
}

/// The subset of a listed article the crawl needs
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListedArticle {
    pub article: String,
    pub model_code: String,
    pub item_name_ja: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    pub page: PageNumber,
    pub page_total: PageNumber,
}

/// A page counter the API sends either as a number or as a numeric string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PageNumber {
    Number(u32),
    Text(String),
}

impl Default for PageNumber {
    fn default() -> Self {
        PageNumber::Number(0)
    }
}

impl PageNumber {
    /// Numeric value, or 0 when the text is not a number
    pub fn value(&self) -> u32 {
        match self {
            PageNumber::Number(n) => *n,
            PageNumber::Text(s) => match s.trim().parse() {
                Ok(n) => n,
                Err(_) => {
                    tracing::warn!("Unreadable page number '{}' in listing response", s);
                    0
                }
            },
        }
    }
}

impl ProductListResponse {
    /// Converts the payload into a listing page of detail-API identifiers
    pub fn into_listing_page(self, endpoints: &Endpoints) -> ListingPage {
        let items = self
            .articles
            .iter()
            .filter(|a| !a.article.is_empty())
            .map(|a| ItemId::new(endpoints.detail(&a.article).to_string()))
            .collect();

        ListingPage {
            items,
            current_page: self.search_options.page.value(),
            total_pages: self.search_options.page_total.value(),
        }
    }
}

/// Reads the `articles` object as a list, keeping the order of the payload
///
/// An empty listing may arrive as `[]` or `null` instead of `{}`.
fn articles_in_payload_order<'de, D>(deserializer: D) -> Result<Vec<ListedArticle>, D::Error>
where
    D: Deserializer<'de>,
{
    struct ArticlesVisitor;

    impl<'de> Visitor<'de> for ArticlesVisitor {
        type Value = Vec<ListedArticle>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map or list of articles")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut articles = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((_key, article)) = map.next_entry::<String, ListedArticle>()? {
                articles.push(article);
            }
            Ok(articles)
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut articles = Vec::with_capacity(seq.size_hint().unwrap_or(0));
            while let Some(article) = seq.next_element::<ListedArticle>()? {
                articles.push(article);
            }
            Ok(articles)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(ArticlesVisitor)
}
