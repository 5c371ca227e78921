//! Tests for the HTTP client module

use super::*;
use crate::auth::{AuthConfig, CachedToken};
use crate::error::Error;
use crate::request::{Request, RequestTemplate};
use crate::types::BackoffType;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpClient {
    let config = HttpClientConfig::builder()
        .base_url(server.uri())
        .no_rate_limit()
        .build();
    HttpClient::with_config(config).unwrap()
}

fn backoff_client(backoff_type: BackoffType, max: Duration) -> HttpClient {
    let config = HttpClientConfig::builder()
        .backoff(backoff_type, Duration::from_millis(100), max)
        .no_rate_limit()
        .build();
    HttpClient::with_config(config).unwrap()
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_http_client_config_default() {
    let config = HttpClientConfig::default();
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.max_retries, 3);
    assert!(config.base_url.is_none());
    assert!(config.rate_limit.is_some());
    assert_eq!(
        config.default_headers.get("Accept").map(String::as_str),
        Some(JSON_API_MEDIA_TYPE)
    );
    assert!(config.user_agent.starts_with("jsonapi-pager/"));
}

#[test]
fn test_http_client_config_builder() {
    let config = HttpClientConfig::builder()
        .base_url("https://api.example.com")
        .timeout(Duration::from_secs(60))
        .max_retries(5)
        .backoff(
            BackoffType::Linear,
            Duration::from_millis(200),
            Duration::from_secs(30),
        )
        .header("X-Custom", "value")
        .user_agent("test-agent/1.0")
        .build();

    assert_eq!(config.base_url, Some("https://api.example.com".to_string()));
    assert_eq!(config.timeout, Duration::from_secs(60));
    assert_eq!(config.max_retries, 5);
    assert_eq!(config.backoff_type, BackoffType::Linear);
    assert_eq!(config.initial_backoff, Duration::from_millis(200));
    assert_eq!(config.max_backoff, Duration::from_secs(30));
    assert_eq!(
        config.default_headers.get("X-Custom"),
        Some(&"value".to_string())
    );
    assert_eq!(config.user_agent, "test-agent/1.0");
}

#[test]
fn test_build_url() {
    let config = HttpClientConfig::builder()
        .base_url("https://api.example.com/edge/")
        .build();
    let client = HttpClient::with_config(config).unwrap();

    assert_eq!(
        client.build_url("/anime").unwrap().as_str(),
        "https://api.example.com/edge/anime"
    );
    assert_eq!(
        client.build_url("https://other.example.com/x?y=1").unwrap().as_str(),
        "https://other.example.com/x?y=1"
    );
}

#[test]
fn test_build_url_relative_without_base() {
    let client = HttpClient::new().unwrap();
    assert!(matches!(
        client.build_url("/anime"),
        Err(Error::Config { .. })
    ));
}

// ============================================================================
// Request Tests
// ============================================================================

#[tokio::test]
async fn test_execute_sends_json_api_accept() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(header("Accept", JSON_API_MEDIA_TYPE))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let response = client.execute(&Request::get("/api/users")).await.unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_execute_template_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/anime"))
        .and(query_param("filter[text]", "cowboy"))
        .and(query_param("include", "genres"))
        .and(query_param("page[offset]", "0"))
        .and(query_param("page[limit]", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let template = RequestTemplate::builder("/anime")
        .filter("text", "cowboy")
        .include("genres")
        .page(0, 2)
        .build();

    let client = client_for(&mock_server);
    let response = client.execute(&template.to_request()).await.unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_http_client_request_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/data"))
        .and(header("X-Request-Id", "req-456"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let response = client
        .execute(&Request::get("/api/data").header("X-Request-Id", "req-456"))
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_http_client_404_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.execute(&Request::get("/api/missing")).await.unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 404, ref body } if body == "Not found"));
    assert!(!err.is_retryable());
}

// ============================================================================
// Auth Tests
// ============================================================================

#[tokio::test]
async fn test_auth_only_when_needed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/private"))
        .and(header("Authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/public"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url(mock_server.uri())
        .no_rate_limit()
        .build();
    let client = HttpClient::with_auth(
        config,
        AuthConfig::Bearer {
            token: Some("secret".to_string()),
        },
    )
    .unwrap();

    client
        .execute(&Request::get("/private").with_auth(true))
        .await
        .unwrap();
    client.execute(&Request::get("/public")).await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    let public = requests
        .iter()
        .find(|r| r.url.path() == "/public")
        .unwrap();
    assert!(!public.headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_auth_required_without_credentials() {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server);

    let err = client
        .execute(&Request::get("/private").with_auth(true))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Auth { .. }));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_updated_token_is_used() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/private"))
        .and(header("Authorization", "Bearer rotated"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url(mock_server.uri())
        .no_rate_limit()
        .build();
    let client = HttpClient::with_auth(config, AuthConfig::Bearer { token: None }).unwrap();
    client
        .authenticator()
        .unwrap()
        .update_token(CachedToken::expires_in("rotated", 3600))
        .await;

    client
        .execute(&Request::get("/private").with_auth(true))
        .await
        .unwrap();
}

// ============================================================================
// Retry Tests
// ============================================================================

#[tokio::test]
async fn test_http_client_retry_on_500() {
    let mock_server = MockServer::start().await;

    // First two calls return 500, third succeeds
    Mock::given(method("GET"))
        .and(path("/api/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url(mock_server.uri())
        .max_retries(3)
        .backoff(
            BackoffType::Constant,
            Duration::from_millis(10),
            Duration::from_secs(1),
        )
        .no_rate_limit()
        .build();

    let client = HttpClient::with_config(config).unwrap();
    let response = client.execute(&Request::get("/api/flaky")).await.unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_http_client_rate_limit_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/limited"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "1")
                .set_body_string("Rate limited"),
        )
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/limited"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url(mock_server.uri())
        .max_retries(2)
        .no_rate_limit()
        .build();

    let client = HttpClient::with_config(config).unwrap();
    let response = client.execute(&Request::get("/api/limited")).await.unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_http_client_max_retries_exceeded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/always-fail"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Server error"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url(mock_server.uri())
        .max_retries(2)
        .backoff(
            BackoffType::Constant,
            Duration::from_millis(10),
            Duration::from_secs(1),
        )
        .no_rate_limit()
        .build();

    let client = HttpClient::with_config(config).unwrap();
    let err = client.execute(&Request::get("/api/always-fail")).await.unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 500, .. }));
}

#[test]
fn test_calculate_backoff_constant() {
    let client = backoff_client(BackoffType::Constant, Duration::from_secs(10));

    assert_eq!(client.calculate_backoff(0), Duration::from_millis(100));
    assert_eq!(client.calculate_backoff(1), Duration::from_millis(100));
    assert_eq!(client.calculate_backoff(5), Duration::from_millis(100));
}

#[test]
fn test_calculate_backoff_linear() {
    let client = backoff_client(BackoffType::Linear, Duration::from_secs(10));

    assert_eq!(client.calculate_backoff(0), Duration::from_millis(100));
    assert_eq!(client.calculate_backoff(1), Duration::from_millis(200));
    assert_eq!(client.calculate_backoff(2), Duration::from_millis(300));
}

#[test]
fn test_calculate_backoff_exponential() {
    let client = backoff_client(BackoffType::Exponential, Duration::from_secs(10));

    assert_eq!(client.calculate_backoff(0), Duration::from_millis(100));
    assert_eq!(client.calculate_backoff(1), Duration::from_millis(200));
    assert_eq!(client.calculate_backoff(2), Duration::from_millis(400));
    assert_eq!(client.calculate_backoff(3), Duration::from_millis(800));
}

#[test]
fn test_calculate_backoff_respects_max() {
    let client = backoff_client(BackoffType::Exponential, Duration::from_millis(500));

    assert_eq!(client.calculate_backoff(10), Duration::from_millis(500));
    assert_eq!(client.calculate_backoff(40), Duration::from_millis(500));
}

#[test]
fn test_http_client_debug() {
    let client = HttpClient::new().unwrap();
    let debug_str = format!("{client:?}");
    assert!(debug_str.contains("HttpClient"));
    assert!(debug_str.contains("has_rate_limiter: true"));
}

// ============================================================================
// Transport Tests
// ============================================================================

#[tokio::test]
async fn test_transport_decodes_document() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/anime"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"data": [{"type": "anime", "id": "1"}]}"#)
                .insert_header("content-type", JSON_API_MEDIA_TYPE),
        )
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new(client_for(&mock_server));
    let document = transport.execute(&Request::get("/anime")).await.unwrap();

    assert_eq!(document["data"][0]["id"], "1");
}

#[tokio::test]
async fn test_transport_follows_absolute_cursor() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/anime"))
        .and(query_param("page[offset]", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let template = RequestTemplate::builder("/ignored").build();
    let cursor = format!("{}/anime?page%5Boffset%5D=20", mock_server.uri());

    let transport = HttpTransport::new(client_for(&mock_server));
    transport
        .execute(&Request::follow(cursor, &template))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_transport_invalid_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new(client_for(&mock_server));
    let err = transport.execute(&Request::get("/broken")).await.unwrap_err();

    assert!(matches!(err, Error::InvalidJson { .. }));
}
