//! Integration tests for `ShopifyClient::fetch_products_page`.
//!
//! Uses `wiremock` to stand up a local Admin API endpoint for each test so
//! no real network traffic is made. Covers the happy paths and every error
//! variant a single page fetch can produce.

use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vitrine_core::ShopifyConfig;
use vitrine_shopify::{ShopifyClient, ShopifyError};

const GRAPHQL_PATH: &str = "/admin/api/2024-07/graphql.json";

fn test_client(server: &MockServer) -> ShopifyClient {
    ShopifyClient::new(&ShopifyConfig {
        shop_domain: server.uri(),
        access_token: "shpat_test".to_string(),
        api_version: "2024-07".to_string(),
        page_size: 250,
        request_timeout_secs: 5,
    })
    .expect("failed to build test ShopifyClient")
}

/// GraphQL body with one product (id = n) and the given page info.
fn one_product_page(n: i64, has_next_page: bool, end_cursor: Option<&str>) -> serde_json::Value {
    json!({
        "data": {
            "products": {
                "pageInfo": { "hasNextPage": has_next_page, "endCursor": end_cursor },
                "edges": [{
                    "node": {
                        "id": format!("gid://shopify/Product/{n}"),
                        "title": format!("Product {n}"),
                        "vendor": "Levis",
                        "handle": format!("product-{n}"),
                        "onlineStoreUrl": null,
                        "tags": ["denim"],
                        "images": { "edges": [] },
                        "variants": { "edges": [{ "node": { "price": "80.00", "compareAtPrice": "100.00" } }] }
                    }
                }]
            }
        }
    })
}

#[tokio::test]
async fn fetch_page_parses_products_and_page_info() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(header("X-Shopify-Access-Token", "shpat_test"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(&one_product_page(1, true, Some("cursor-2"))),
        )
        .mount(&server)
        .await;

    let client = test_client(&server);
    let page = client
        .fetch_products_page(None, None)
        .await
        .expect("expected Ok page");

    assert_eq!(page.products.len(), 1);
    assert_eq!(page.products[0].id, "gid://shopify/Product/1");
    assert!(page.has_next_page);
    assert_eq!(page.end_cursor.as_deref(), Some("cursor-2"));
}

#[tokio::test]
async fn fetch_page_sends_cursor_and_vendor_filter() {
    let server = MockServer::start().await;

    // The mock only matches when both the cursor and the server-side vendor
    // scope appear in the request body.
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains("cursor-2"))
        .and(body_string_contains("vendor:'Levis'"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&one_product_page(2, false, None)))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let page = client
        .fetch_products_page(Some("cursor-2"), Some("Levis"))
        .await
        .expect("expected Ok page");

    assert_eq!(page.products.len(), 1);
    assert!(!page.has_next_page);
}

#[tokio::test]
async fn fetch_page_propagates_rate_limit_with_retry_after() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "30"))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = client.fetch_products_page(None, None).await;

    match result.expect_err("expected Err for 429") {
        ShopifyError::RateLimited { retry_after_secs } => assert_eq!(retry_after_secs, 30),
        other => panic!("expected ShopifyError::RateLimited, got: {other:?}"),
    }
}

#[tokio::test]
async fn fetch_page_rate_limit_without_retry_after_defaults_to_60s() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let client = test_client(&server);
    match client
        .fetch_products_page(None, None)
        .await
        .expect_err("expected Err for 429")
    {
        ShopifyError::RateLimited { retry_after_secs } => assert_eq!(retry_after_secs, 60),
        other => panic!("expected ShopifyError::RateLimited, got: {other:?}"),
    }
}

#[tokio::test]
async fn fetch_page_propagates_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = client.fetch_products_page(None, None).await;

    assert!(
        matches!(result, Err(ShopifyError::Unauthorized { status: 401 })),
        "expected ShopifyError::Unauthorized, got: {result:?}"
    );
}

#[tokio::test]
async fn fetch_page_propagates_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = client.fetch_products_page(None, None).await;

    assert!(
        matches!(result, Err(ShopifyError::NotFound { .. })),
        "expected ShopifyError::NotFound, got: {result:?}"
    );
}

#[tokio::test]
async fn fetch_page_propagates_unexpected_status_for_5xx() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = test_client(&server);
    match client
        .fetch_products_page(None, None)
        .await
        .expect_err("expected Err for 503")
    {
        ShopifyError::UnexpectedStatus { status, .. } => assert_eq!(status, 503),
        other => panic!("expected ShopifyError::UnexpectedStatus, got: {other:?}"),
    }
}

#[tokio::test]
async fn fetch_page_propagates_malformed_json() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("this is not json"))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = client.fetch_products_page(None, None).await;

    assert!(
        matches!(result, Err(ShopifyError::Deserialize { .. })),
        "expected ShopifyError::Deserialize, got: {result:?}"
    );
}

#[tokio::test]
async fn fetch_page_surfaces_graphql_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "errors": [{ "message": "Throttled" }, { "message": "try again later" }]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    match client
        .fetch_products_page(None, None)
        .await
        .expect_err("expected Err for GraphQL errors")
    {
        ShopifyError::Api { message } => {
            assert_eq!(message, "Throttled; try again later");
        }
        other => panic!("expected ShopifyError::Api, got: {other:?}"),
    }
}
