//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small storefront-shaped catalog and
//! run the full crawl cycle end-to-end: listing pages, detail payloads, size
//! charts and the review widget.

use serde_json::{json, Value};
use sku_harvest::config::{Config, CrawlerConfig, OutputConfig, SourceConfig, UserAgentConfig};
use sku_harvest::crawler::{run_crawl, FetchEngine, ProgressListener};
use sku_harvest::output::write_outputs;
use sku_harvest::source::adidas::{Endpoints, RatingSource};
use sku_harvest::source::{AuxiliaryData, AuxiliarySource};
use sku_harvest::{AuxiliaryKey, CanonicalRecord, HarvestError};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RECOMMEND_ONLY_WIDGET: &str = r#"var materials={"BVRRRatingSummarySourceID":"<div class=\"BVRRRatingSummary\"><span class=\"BVRRBuyAgainPercentage\"><span class=\"BVRRNumber\">75%<\/span><\/span><\/div>","BVRRSecondaryRatingSummarySourceID":""};"#;

const RATING_WIDGET: &str = r#"var materials={"BVRRRatingSummarySourceID":"<div class=\"BVRRRatingSummary\"><span itemprop=\"ratingValue\">4.5<\/span><span class=\"BVRRBuyAgainPercentage\"><span class=\"BVRRNumber\">92%<\/span><\/span><div class=\"BVRRRatingEntry\"><div class=\"BVRRRatingHeader\">Fit<\/div><div class=\"BVRRRatingRadioImage\"><img alt=\"Slightly large\" \/><\/div><\/div><\/div>","BVRRSecondaryRatingSummarySourceID":""};"#;

/// Creates a test configuration pointing every endpoint at the mock server
fn create_test_config(base_url: &str, item_limit: usize, workers: usize) -> Config {
    Config {
        crawler: CrawlerConfig {
            item_limit,
            workers,
            max_delay_ms: 0,
            per_host_concurrency: 4,
            request_timeout_secs: 5,
            max_retries: 0,
            retry_backoff_ms: 1,
        },
        source: SourceConfig {
            base_url: base_url.to_string(),
            review_base_url: base_url.to_string(),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn listing_body(articles: &[&str], page: u32, total: u32) -> Value {
    let entries: serde_json::Map<String, Value> = articles
        .iter()
        .map(|code| {
            (
                code.to_string(),
                json!({"article": code, "model_code": format!("M-{}", code)}),
            )
        })
        .collect();

    json!({
        "articles": entries,
        "search_options": {"page": page.to_string(), "page_total": total}
    })
}

fn detail_body(article: &str) -> Value {
    json!({
        "page": {
            "breadcrumbs": [{"label": "Men", "searchUrl": "/men/"}],
            "categories": [{"label": "Running", "link": "/running/"}]
        },
        "product": {
            "article": {
                "articleCode": article,
                "modelCode": format!("M-{}", article),
                "name": format!("Product {}", article),
                "price": {"current": {"withTax": "¥5,500", "withoutTax": 5000}, "discountType": ""},
                "image": {"details": [{"imageUrl": {"large": format!("/img/{}.jpg", article)}}]},
                "skus": [
                    {"articleCode": format!("{}-M", article), "sizeName": "M",
                     "status": {"inStockEc": true, "inStockStore": true, "isSoldOut": false}}
                ]
            },
            "model": {
                "modelCode": format!("M-{}", article),
                "review": {"fitbarScore": 3.0, "reviewCount": 1, "reviewSeoLd": []}
            }
        }
    })
}

fn size_chart_body() -> Value {
    json!({
        "is_exact_flag": 1,
        "size_chart": {
            "0": {
                "header": {"0": {"0": {"value": "Size"}, "1": {"value": "Chest"}}},
                "body": {
                    "0": {"0": {"value": "S"}, "1": {"value": "82-88"}},
                    "1": {"0": {"value": "M"}, "1": {"value": "88-94"}}
                }
            }
        }
    })
}

/// Mounts a two-page catalog of five articles
///
/// A3's detail fails with HTTP 500. Only A1 has a size chart and a rating;
/// every other auxiliary request falls through to wiremock's 404.
async fn mount_catalog(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/f/v1/pub/product/list"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing_body(
            &["A1", "A2", "A3"],
            1,
            2,
        )))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/f/v1/pub/product/list"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(listing_body(&["A4", "A5"], 2, 2)),
        )
        .mount(mock_server)
        .await;

    for article in ["A1", "A2", "A4", "A5"] {
        Mock::given(method("GET"))
            .and(path(format!("/f/v2/web/pub/products/article/{}/", article)))
            .respond_with(ResponseTemplate::new(200).set_body_json(detail_body(article)))
            .mount(mock_server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path("/f/v2/web/pub/products/article/A3/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/f/v1/pub/size_chart/M-A1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(size_chart_body()))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/7896-ja_jp/M-A1/reviews.djs"))
        .and(query_param("productattribute_itemKcod", "A1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RATING_WIDGET))
        .mount(mock_server)
        .await;
}

fn find<'a>(records: &'a [CanonicalRecord], article: &str) -> &'a CanonicalRecord {
    records
        .iter()
        .find(|r| r.article_code == article)
        .unwrap_or_else(|| panic!("No record for {}", article))
}

#[tokio::test]
async fn test_full_crawl_with_partial_failures() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server).await;

    let config = create_test_config(&mock_server.uri(), 0, 2);
    let outcome = run_crawl(config, CancellationToken::new(), None)
        .await
        .expect("Crawl failed");

    assert_eq!(outcome.source, "adidas");
    assert_eq!(outcome.discovered, 5);
    assert_eq!(outcome.records.len(), 4);
    assert_eq!(outcome.progress.completed, 5);
    assert_eq!(outcome.progress.failed, 1);
    assert_eq!(outcome.failures.len(), 1);
    assert!(outcome.failures[0].item.as_str().ends_with("/article/A3/"));

    // Fully aggregated item
    let a1 = find(&outcome.records, "A1");
    assert_eq!(a1.name, "Product A1");
    assert_eq!(a1.size_charts.len(), 2);
    assert_eq!(a1.size_charts[1].size, "M");
    assert_eq!(a1.size_charts[1].measurements[1].kind, "Chest");
    assert_eq!(a1.rating, "4.5");
    assert_eq!(a1.recommended_rate, "92%");
    assert_eq!(a1.rating_senses[0].value, "Slightly large");

    // Both auxiliaries missing: primary fields intact
    let a2 = find(&outcome.records, "A2");
    assert_eq!(a2.name, "Product A2");
    assert_eq!(a2.model_code, "M-A2");
    assert_eq!(a2.price.with_tax, "¥5,500");
    assert_eq!(a2.skus.len(), 1);
    assert!(a2.size_charts.is_empty());
    assert!(a2.rating.is_empty());
    assert!(a2.rating_senses.is_empty());
}

#[tokio::test]
async fn test_item_limit_stops_discovery_early() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server).await;

    let config = create_test_config(&mock_server.uri(), 2, 1);
    let outcome = run_crawl(config, CancellationToken::new(), None)
        .await
        .expect("Crawl failed");

    assert_eq!(outcome.discovered, 2);
    let codes: Vec<_> = outcome
        .records
        .iter()
        .map(|r| r.article_code.as_str())
        .collect();
    assert_eq!(codes, vec!["A1", "A2"]);

    let listing_requests = mock_server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == "/f/v1/pub/product/list")
        .count();
    assert_eq!(listing_requests, 1);
}

#[tokio::test]
async fn test_listing_failure_aborts_run() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/f/v1/pub/product/list"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 0, 1);
    let result = run_crawl(config, CancellationToken::new(), None).await;

    assert!(matches!(result, Err(HarvestError::Discovery { page: 1, .. })));
}

#[tokio::test]
async fn test_cancelled_run_produces_nothing() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server).await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let config = create_test_config(&mock_server.uri(), 0, 1);
    let result = run_crawl(config, cancel, None).await;

    assert!(matches!(result, Err(HarvestError::Cancelled { .. })));
}

#[tokio::test]
async fn test_progress_reaches_total() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server).await;

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let listener: ProgressListener = Arc::new(move |s| sink.lock().unwrap().push(s));

    let config = create_test_config(&mock_server.uri(), 0, 3);
    run_crawl(config, CancellationToken::new(), Some(listener))
        .await
        .expect("Crawl failed");

    let seen = seen.lock().unwrap();
    assert!(seen.windows(2).all(|w| w[0].completed < w[1].completed));
    let last = seen.last().unwrap();
    assert_eq!((last.completed, last.total, last.failed), (5, 5, 1));
}

#[tokio::test]
async fn test_crawl_outputs_are_written() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server).await;
    let dir = TempDir::new().unwrap();

    let mut config = create_test_config(&mock_server.uri(), 0, 1);
    config.output = OutputConfig {
        csv_path: dir.path().join("products.csv").to_string_lossy().to_string(),
        json_path: dir.path().join("products.json").to_string_lossy().to_string(),
    };
    let output = config.output.clone();

    let outcome = run_crawl(config, CancellationToken::new(), None)
        .await
        .expect("Crawl failed");
    write_outputs(&output, &outcome.records).expect("Failed to write outputs");

    let csv = std::fs::read_to_string(dir.path().join("products.csv")).unwrap();
    assert_eq!(csv.lines().count(), 5);
    assert!(csv.contains("S (Size: S, Chest: 82-88); M (Size: M, Chest: 88-94)"));

    let json = std::fs::read_to_string(dir.path().join("products.json")).unwrap();
    let records: Vec<CanonicalRecord> = serde_json::from_str(&json).unwrap();
    let codes: Vec<_> = records.iter().map(|r| r.article_code.as_str()).collect();
    assert_eq!(codes, vec!["A1", "A2", "A4", "A5"]);
}

#[tokio::test]
async fn test_recommendation_without_score_is_kept() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/7896-ja_jp/M-A9/reviews.djs"))
        .and(query_param("productattribute_itemKcod", "A9"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RECOMMEND_ONLY_WIDGET))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 0, 1);
    let engine = FetchEngine::new(&config.crawler, &UserAgentConfig::default())
        .expect("Failed to build engine");
    let endpoints = Endpoints::from_config(&config.source).expect("Invalid endpoints");
    let source = RatingSource::new(Arc::new(engine), Arc::new(endpoints));

    let key = AuxiliaryKey {
        model_key: "M-A9".to_string(),
        item_key: "A9".to_string(),
    };
    let summary = match source.fetch(&key).await {
        Ok(AuxiliaryData::Rating(summary)) => summary,
        Ok(_) => panic!("Rating source returned another kind of data"),
        Err(err) => panic!("Rating fetch failed: {}", err),
    };

    assert!(summary.rating.is_empty());
    assert!(summary.senses.is_empty());
    assert_eq!(summary.recommended_rate, "75%");
}
