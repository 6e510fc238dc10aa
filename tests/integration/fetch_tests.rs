//! Integration tests for the fetch engine
//!
//! These tests use wiremock to check retry behavior, error classification
//! and request metadata against a real HTTP server.

use serde::Deserialize;
use sku_harvest::config::{CrawlerConfig, UserAgentConfig};
use reqwest::RequestBuilder;
use sku_harvest::crawler::{FetchEngine, RequestHook};
use sku_harvest::FetchError;
use std::sync::Arc;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates an engine with no delay and a fast retry backoff
fn create_test_engine(max_retries: u32) -> FetchEngine {
    let crawler = CrawlerConfig {
        max_delay_ms: 0,
        max_retries,
        retry_backoff_ms: 5,
        request_timeout_secs: 5,
        ..Default::default()
    };
    let agents = UserAgentConfig {
        pool: vec!["HarvestTest/1.0".to_string()],
    };
    FetchEngine::new(&crawler, &agents).expect("Failed to build engine")
}

fn url_for(server: &MockServer, route: &str) -> Url {
    Url::parse(&format!("{}{}", server.uri(), route)).expect("Failed to build URL")
}

#[tokio::test]
async fn test_transient_failure_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("recovered"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let engine = create_test_engine(2);
    let body = engine.get_text(&url_for(&mock_server, "/flaky")).await.unwrap();

    assert_eq!(body, "recovered");
}

#[tokio::test]
async fn test_retries_are_bounded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let engine = create_test_engine(2);
    let error = engine
        .get_text(&url_for(&mock_server, "/down"))
        .await
        .unwrap_err();

    assert!(matches!(error, FetchError::Status { status: 500, .. }));
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let engine = create_test_engine(3);
    let error = engine
        .get_text(&url_for(&mock_server, "/missing"))
        .await
        .unwrap_err();

    assert!(matches!(error, FetchError::Status { status: 404, .. }));
    assert!(!error.is_transient());
}

#[tokio::test]
async fn test_rate_limited_response_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    let engine = create_test_engine(2);
    let body = engine.get_text(&url_for(&mock_server, "/busy")).await.unwrap();

    assert_eq!(body, "ok");
}

#[tokio::test]
async fn test_user_agent_comes_from_pool() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/whoami"))
        .and(header("user-agent", "HarvestTest/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("known"))
        .mount(&mock_server)
        .await;

    let engine = create_test_engine(0);
    let body = engine
        .get_text(&url_for(&mock_server, "/whoami"))
        .await
        .unwrap();

    assert_eq!(body, "known");
}

/// Tags every request with a fixed run identifier
struct RunTag(&'static str);

impl RequestHook for RunTag {
    fn prepare(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("x-harvest-run", self.0)
    }
}

#[tokio::test]
async fn test_custom_hook_applies_to_every_attempt() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tagged"))
        .and(header("x-harvest-run", "run-42"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/tagged"))
        .and(header("x-harvest-run", "run-42"))
        .respond_with(ResponseTemplate::new(200).set_body_string("tagged"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let engine = create_test_engine(1).with_hook(Arc::new(RunTag("run-42")));
    let body = engine
        .get_text(&url_for(&mock_server, "/tagged"))
        .await
        .unwrap();

    assert_eq!(body, "tagged");
}

#[derive(Debug, Deserialize)]
struct Payload {
    count: u32,
}

#[tokio::test]
async fn test_json_is_decoded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"count": 7}"#))
        .mount(&mock_server)
        .await;

    let engine = create_test_engine(0);
    let payload: Payload = engine
        .get_json(&url_for(&mock_server, "/data"))
        .await
        .unwrap();

    assert_eq!(payload.count, 7);
}

#[tokio::test]
async fn test_malformed_json_is_a_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let engine = create_test_engine(2);
    let error = engine
        .get_json::<Payload>(&url_for(&mock_server, "/data"))
        .await
        .unwrap_err();

    assert!(matches!(error, FetchError::Decode { .. }));
}

#[tokio::test]
async fn test_unreachable_host_is_a_connect_error() {
    // Nothing listens on port 9 of the loopback interface
    let engine = create_test_engine(0);
    let error = engine
        .get_text(&Url::parse("http://127.0.0.1:9/").unwrap())
        .await
        .unwrap_err();

    assert!(error.is_transient());
}
