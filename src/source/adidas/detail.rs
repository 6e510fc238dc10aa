//! Detail API payload and its mapping to the canonical record

use super::Endpoints;
use crate::record::{
    Breadcrumb, CanonicalRecord, Category, Coordinate, Description, Price, Review, Sku,
    SkuStatus, SizeChoice, Technology,
};
use crate::source::AuxiliaryKey;
use serde::{Deserialize, Deserializer};

/// Response of the product detail API
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductResponse {
    pub page: Page,
    pub product: Product,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Page {
    pub breadcrumbs: Vec<PageBreadcrumb>,
    pub categories: Vec<PageCategory>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageBreadcrumb {
    pub label: String,
    pub search_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PageCategory {
    pub label: String,
    pub link: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Product {
    pub article: Article,
    pub model: Model,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Article {
    pub article_code: String,
    pub model_code: String,
    pub name: String,
    pub price: ArticlePrice,
    pub coordinates: Coordinates,
    pub description: ArticleDescription,
    pub image: Images,
    pub skus: Vec<ArticleSku>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArticlePrice {
    pub current: PriceDetail,
    pub discount_type: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PriceDetail {
    #[serde(deserialize_with = "string_or_number")]
    pub with_tax: String,
    pub without_tax: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Coordinates {
    pub articles: Vec<CoordinateArticle>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CoordinateArticle {
    pub article_code: String,
    pub image: String,
    pub name: String,
    pub price: ArticlePrice,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ArticleDescription {
    pub messages: Messages,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Messages {
    pub breads: Vec<String>,
    pub main_text: String,
    pub title: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Images {
    pub details: Vec<ImageDetail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageDetail {
    pub image_url: ImageUrl,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImageUrl {
    pub large: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArticleSku {
    pub article_code: String,
    pub size_name: String,
    pub status: ArticleSkuStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArticleSkuStatus {
    pub in_stock_ec: bool,
    pub in_stock_store: bool,
    pub is_sold_out: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Model {
    pub model_code: String,
    pub description: ModelDescription,
    pub review: ModelReview,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ModelDescription {
    pub technology: Vec<ModelTechnology>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ModelTechnology {
    pub name: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelReview {
    pub fitbar_score: f64,
    pub rating_avg: f64,
    pub review_count: u64,
    pub review_seo_ld: Vec<ReviewSeoLd>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReviewSeoLd {
    pub date_published: String,
    pub name: String,
    pub review_body: String,
    pub review_rating: ReviewRating,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReviewRating {
    pub best_rating: f64,
    #[serde(deserialize_with = "string_or_number")]
    pub rating_value: String,
}

impl ArticlePrice {
    fn to_price(&self) -> Price {
        Price {
            with_tax: self.current.with_tax.clone(),
            without_tax: format!("{:.6}", self.current.without_tax),
            discount_type: self.discount_type.clone(),
        }
    }
}

impl ProductResponse {
    /// Maps the primary payload to a record; auxiliary fields stay empty
    pub fn to_record(&self, endpoints: &Endpoints) -> CanonicalRecord {
        let article = &self.product.article;
        let model = &self.product.model;

        CanonicalRecord {
            name: article.name.clone(),
            model_code: self.model_code().to_string(),
            article_code: article.article_code.clone(),
            price: article.price.to_price(),
            url: endpoints.product_page(&article.article_code),
            images: article
                .image
                .details
                .iter()
                .map(|d| endpoints.absolute(&d.image_url.large))
                .collect(),
            breadcrumb: self
                .page
                .breadcrumbs
                .iter()
                .map(|b| b.label.as_str())
                .collect::<Vec<_>>()
                .join(" / "),
            breadcrumbs: self
                .page
                .breadcrumbs
                .iter()
                .map(|b| Breadcrumb {
                    label: b.label.clone(),
                    search_url: endpoints.absolute(&b.search_url),
                })
                .collect(),
            kws: self
                .page
                .categories
                .iter()
                .map(|c| c.label.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            categories: self
                .page
                .categories
                .iter()
                .map(|c| Category {
                    label: c.label.clone(),
                    link: endpoints.absolute(&c.link),
                })
                .collect(),
            size_choice: self.size_choice(),
            coordinates: article
                .coordinates
                .articles
                .iter()
                .map(|c| Coordinate {
                    product_name: c.name.clone(),
                    product_url: endpoints.product_page(&c.article_code),
                    product_image: endpoints.absolute(&c.image),
                    product_price: c.price.to_price(),
                })
                .collect(),
            description: Description {
                title: article.description.messages.title.clone(),
                general: article.description.messages.main_text.clone(),
                breads: article.description.messages.breads.clone(),
            },
            skus: article
                .skus
                .iter()
                .map(|s| Sku {
                    size_name: s.size_name.clone(),
                    code: s.article_code.clone(),
                    status: SkuStatus {
                        is_stock: s.status.in_stock_ec,
                        is_stock_store: s.status.in_stock_store,
                        is_sold_out: s.status.is_sold_out,
                    },
                })
                .collect(),
            technologies: model
                .description
                .technology
                .iter()
                .map(|t| Technology {
                    name: t.name.clone(),
                    desc: t.text.clone(),
                })
                .collect(),
            review_count: model.review.review_count.to_string(),
            reviews: model
                .review
                .review_seo_ld
                .iter()
                .map(|r| Review {
                    author_name: r.name.clone(),
                    date_published: r.date_published.clone(),
                    body: r.review_body.clone(),
                    best_rating: format!("{:.1}", r.review_rating.best_rating),
                    rating_value: r.review_rating.rating_value.clone(),
                })
                .collect(),
            ..Default::default()
        }
    }

    /// Model key for size data and (model, article) pair for rating data
    ///
    /// `None` when either code is missing, in which case no auxiliary fetch
    /// is attempted.
    pub fn auxiliary_key(&self) -> Option<AuxiliaryKey> {
        let model = self.model_code();
        let article = self.product.article.article_code.as_str();

        if model.is_empty() || article.is_empty() {
            return None;
        }

        Some(AuxiliaryKey {
            model_key: model.to_string(),
            item_key: article.to_string(),
        })
    }

    /// Model code, preferring the model block over the article's copy
    fn model_code(&self) -> &str {
        if self.product.model.model_code.is_empty() {
            &self.product.article.model_code
        } else {
            &self.product.model.model_code
        }
    }

    fn size_choice(&self) -> SizeChoice {
        let available: Vec<&str> = self
            .product
            .article
            .skus
            .iter()
            .filter(|s| s.status.in_stock_ec)
            .map(|s| s.size_name.as_str())
            .collect();

        SizeChoice {
            available_size: available.join(", "),
            sense_of_the_size: format!("{:.1}", self.product.model.review.fitbar_score),
        }
    }
}

/// Accepts `"4"`, `4` or `4.5` and keeps it as text
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
        Null(()),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(f) => f.to_string(),
        Raw::Null(()) => String::new(),
    })
}
