//! Tests for the HTTP module

use super::*;
use crate::config::ClientConfig;
use crate::error::Error;
use crate::types::Query;
use reqwest::Method;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RETRY_DELAY: Duration = Duration::from_millis(20);

fn client_for(server: &MockServer) -> MagentoClient {
    let config = ClientConfig::builder()
        .base_url(server.uri())
        .token("secret")
        .scope("toto")
        .retry_delay(RETRY_DELAY)
        .build()
        .unwrap();
    MagentoClient::new(config).unwrap()
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.map_or(0, |r| r.len())
}

#[test]
fn test_request_options_builder() {
    let options = RequestOptions::new()
        .query(Query::new().with("a", 1))
        .json(json!({"key": "value"}))
        .retry(2)
        .raise_on_error(true)
        .async_bulk()
        .bypass_read_only();

    assert!(options.query.is_some());
    assert!(options.body.is_some());
    assert_eq!(options.retry, 2);
    assert!(options.raise_on_error);
    assert!(options.async_bulk);
    assert!(options.bypass_read_only);

    let defaults = RequestOptions::new();
    assert_eq!(defaults.retry, 0);
    assert!(!defaults.raise_on_error);
}

#[test]
fn test_escape_path() {
    assert_eq!(escape_path("SKU-1_a.b~c"), "SKU-1_a.b~c");
    assert_eq!(escape_path("a/b"), "a%2Fb");
    assert_eq!(escape_path("with space"), "with%20space");
    assert_eq!(escape_path("é"), "%C3%A9");
}

#[test]
fn test_client_requires_credentials() {
    let config = ClientConfig {
        base_url: "https://shop.example.com".to_string(),
        ..ClientConfig::default()
    };
    let err = MagentoClient::new(config).unwrap_err();
    assert!(matches!(err, Error::MissingConfigField { .. }));
}

#[test]
fn test_api_url() {
    let config = ClientConfig::builder()
        .base_url("http://test/")
        .token("secret")
        .scope("toto")
        .build()
        .unwrap();
    let client = MagentoClient::new(config).unwrap();

    assert_eq!(
        client.api_url("/V1/test/url", false),
        "http://test/rest/toto/V1/test/url"
    );
    assert_eq!(
        client.api_url("/V1/test/url", true),
        "http://test/rest/toto/async/bulk/V1/test/url"
    );
}

#[tokio::test]
async fn test_request_path_and_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/toto/V1/test/url"))
        .and(header("Authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let response = client
        .get_api("/V1/test/url", RequestOptions::new())
        .await
        .unwrap();

    assert!(response.is_success());
    let body: Value = response.json().unwrap();
    assert_eq!(body["ok"], true);

    let requests = server.received_requests().await.unwrap();
    let user_agent = requests[0].headers.get("user-agent").unwrap();
    assert!(user_agent.to_str().unwrap().starts_with("magento-client/"));
}

#[tokio::test]
async fn test_request_async_bulk() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/rest/toto/async/bulk/V1/products/bySku"))
        .and(body_json(json!([{"product": {"sku": "A"}}])))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({"bulk_uuid": "u-1"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let response = client
        .put_api(
            "/V1/products/bySku",
            RequestOptions::raising()
                .json(json!([{"product": {"sku": "A"}}]))
                .async_bulk(),
        )
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 202);
}

#[tokio::test]
async fn test_request_query_params() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/toto/V1/store/storeConfigs"))
        .and(query_param("storeCodes", "default"))
        .and(query_param("searchCriteria[pageSize]", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let query = Query::new()
        .with("storeCodes", json!(["default"]))
        .with("searchCriteria[pageSize]", 5);
    let response = client
        .get_api("/V1/store/storeConfigs", RequestOptions::raising().query(query))
        .await
        .unwrap();

    assert!(response.is_success());
}

#[tokio::test]
async fn test_request_rejects_non_api_path() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let err = client
        .get_api("/rest/all/V1/products", RequestOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidPath { .. }));
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_failure_returned_raw_without_raise() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/toto/V1/products/S404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "nope"})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let response = client
        .get_api("/V1/products/S404", RequestOptions::new())
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_structured_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/toto/V1/products"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(json!({"message": "SKU not found", "parameters": ["X1"]})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .post_api("/V1/products", RequestOptions::raising().json(json!({})))
        .await
        .unwrap_err();

    let api = err.as_api_error().expect("structured error");
    assert_eq!(api.message, "SKU not found");
    assert_eq!(api.parameters, Some(json!(["X1"])));
    assert_eq!(api.response.status().as_u16(), 422);
}

#[tokio::test]
async fn test_generic_status_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/toto/V1/boom"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .get_api("/V1/boom", RequestOptions::raising())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 500, .. }));
}

#[tokio::test]
async fn test_retry_until_success() {
    let server = MockServer::start().await;

    // First two calls fail, third succeeds
    Mock::given(method("GET"))
        .and(path("/rest/toto/V1/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/toto/V1/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let start = Instant::now();
    let response = client
        .get_api("/V1/flaky", RequestOptions::raising().retry(2))
        .await
        .unwrap();

    assert!(response.is_success());
    assert_eq!(request_count(&server).await, 3);
    assert!(start.elapsed() >= RETRY_DELAY * 2);
}

#[tokio::test]
async fn test_retry_exhausted() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/toto/V1/down"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "down"})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .get_api("/V1/down", RequestOptions::raising().retry(2))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "down");
    assert_eq!(request_count(&server).await, 3);
}

#[tokio::test]
async fn test_no_retry_on_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/toto/V1/fine"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .get_api("/V1/fine", RequestOptions::raising().retry(5))
        .await
        .unwrap();

    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_read_only_refuses_writes() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/all/V1/products/base-prices-information"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let config = ClientConfig::builder()
        .base_url(server.uri())
        .token("secret")
        .read_only(true)
        .build()
        .unwrap();
    let client = MagentoClient::new(config).unwrap();

    let err = client
        .request(Method::POST, "/V1/products", RequestOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ReadOnly { .. }));
    assert_eq!(request_count(&server).await, 0);

    let response = client
        .post_api(
            "/V1/products/base-prices-information",
            RequestOptions::raising().json(json!({"skus": []})).bypass_read_only(),
        )
        .await
        .unwrap();
    assert!(response.is_success());
}

#[tokio::test]
async fn test_get_json_api_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/toto/V1/products/S200"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sku": "S200"})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/toto/V1/products/S404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({})))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let found: Option<Value> = client.get_json_api("/V1/products/S200", None).await.unwrap();
    assert_eq!(found.unwrap()["sku"], "S200");

    let missing: Option<Value> = client.get_json_api("/V1/products/S404", None).await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_get_json_raises() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/toto/V1/customers/1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "The consumer isn't authorized to access %resources.",
            "parameters": {"resources": "Magento_Customer::customer"}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .get_json::<Value>("/V1/customers/1", None)
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "The consumer isn't authorized to access Magento_Customer::customer."
    );
    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn test_slow_response_is_not_cut_short() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/toto/V1/products"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"items": [], "total_count": 0}))
                .set_delay(Duration::from_millis(1500)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(client.config().timeout(), None);

    let response = client
        .get_api("/V1/products", RequestOptions::raising().retry(3))
        .await
        .unwrap();
    assert!(response.is_success());
    assert_eq!(request_count(&server).await, 1);
}
