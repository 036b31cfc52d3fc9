//! Integration tests for the Shopify and WooCommerce adapters.
//!
//! Each test stands up a `wiremock` server so no real network traffic is made.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shadowcrawl_core::PlatformKind;
use shadowcrawl_scraper::{
    build_http_client, CrawlError, PlatformAdapter, ShopifyAdapter, WooCommerceAdapter,
};

fn test_client() -> reqwest::Client {
    build_http_client(Duration::from_secs(5), "shadowcrawl-test/0.1")
        .expect("failed to build test client")
}

fn shopify_product(id: i64, title: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "handle": title.to_lowercase().replace(' ', "-"),
        "body_html": null,
        "images": [{"id": id * 10, "src": format!("https://cdn.shopify.com/{id}.jpg")}],
        "variants": [{"id": id * 100, "price": "19.99", "position": 1, "available": true}]
    })
}

// ---------------------------------------------------------------------------
// Shopify
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shopify_returns_products_verbatim() {
    let server = MockServer::start().await;
    let p1 = shopify_product(1, "Tote Bag");
    let p2 = shopify_product(2, "Enamel Pin");

    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("limit", "250"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"products": [p1.clone(), p2.clone()]})))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = ShopifyAdapter::new(test_client());
    let records = adapter.extract(&server.uri()).await.expect("extract failed");

    let raw: Vec<_> = records.iter().map(|r| r.raw.clone()).collect();
    assert_eq!(raw, vec![p1, p2]);
    assert_eq!(records[0].title, "Tote Bag");
    assert_eq!(records[1].source_product_id.as_deref(), Some("2"));
    assert!(records.iter().all(|r| r.platform == PlatformKind::Shopify));
}

#[tokio::test]
async fn shopify_uses_store_root_when_url_has_path() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"products": []})))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = ShopifyAdapter::new(test_client());
    let store_url = format!("{}/collections/all", server.uri());
    let records = adapter.extract(&store_url).await.expect("extract failed");
    assert!(records.is_empty());
}

#[tokio::test]
async fn shopify_server_error_is_http_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let adapter = ShopifyAdapter::new(test_client());
    let err = adapter.extract(&server.uri()).await.unwrap_err();
    assert!(
        matches!(err, CrawlError::HttpStatus { status: 500, .. }),
        "expected HttpStatus(500), got: {err:?}"
    );
}

#[tokio::test]
async fn shopify_not_found_is_http_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let adapter = ShopifyAdapter::new(test_client());
    let err = adapter.extract(&server.uri()).await.unwrap_err();
    assert!(matches!(err, CrawlError::HttpStatus { status: 404, .. }));
}

#[tokio::test]
async fn shopify_html_body_is_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>password page</html>"))
        .mount(&server)
        .await;

    let adapter = ShopifyAdapter::new(test_client());
    let err = adapter.extract(&server.uri()).await.unwrap_err();
    assert!(matches!(err, CrawlError::Parse { .. }), "got: {err:?}");
}

#[tokio::test]
async fn shopify_skips_only_non_object_entries() {
    let server = MockServer::start().await;
    let good = shopify_product(7, "Good One");
    let sparse = json!({"title": "no id"});

    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "products": [sparse.clone(), good.clone(), null]
        })))
        .mount(&server)
        .await;

    let adapter = ShopifyAdapter::new(test_client());
    let records = adapter.extract(&server.uri()).await.expect("extract failed");
    let raw: Vec<_> = records.iter().map(|r| r.raw.clone()).collect();
    assert_eq!(raw, vec![sparse, good]);
}

#[tokio::test]
async fn shopify_returns_minimal_products_verbatim() {
    let server = MockServer::start().await;
    let tote = json!({"id": 1, "title": "Tote"});
    let mug = json!({
        "id": 2,
        "title": "Mug",
        "handle": "mug",
        "variants": [{"price": 12.5}]
    });

    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"products": [tote.clone(), mug.clone()]})),
        )
        .mount(&server)
        .await;

    let adapter = ShopifyAdapter::new(test_client());
    let records = adapter.extract(&server.uri()).await.expect("extract failed");

    let raw: Vec<_> = records.iter().map(|r| r.raw.clone()).collect();
    assert_eq!(raw, vec![tote, mug]);
    assert!(records[0].source_url.is_none());
    assert!(records[0].price.is_none());
    assert_eq!(records[1].price.as_deref(), Some("12.5"));
    assert_eq!(
        records[1].source_url,
        Some(format!("{}/products/mug", server.uri()))
    );
}

#[tokio::test]
async fn shopify_timeout_is_network_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"products": []}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = build_http_client(Duration::from_millis(200), "shadowcrawl-test/0.1").unwrap();
    let adapter = ShopifyAdapter::new(client);
    let err = adapter.extract(&server.uri()).await.unwrap_err();
    assert!(matches!(err, CrawlError::Network(_)), "got: {err:?}");
}

// ---------------------------------------------------------------------------
// WooCommerce
// ---------------------------------------------------------------------------

#[tokio::test]
async fn woocommerce_reads_store_api() {
    let server = MockServer::start().await;
    let product = json!({
        "id": 31,
        "name": "Sourdough Loaf",
        "permalink": format!("{}/product/sourdough-loaf/", server.uri()),
        "prices": {"price": "850", "currency_code": "CAD", "currency_minor_unit": 2},
        "images": [{"src": "https://bakery.example/loaf.jpg"}]
    });

    Mock::given(method("GET"))
        .and(path("/wp-json/wc/store/v1/products"))
        .and(query_param("per_page", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([product.clone()])))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = WooCommerceAdapter::new(test_client());
    let records = adapter.extract(&server.uri()).await.expect("extract failed");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].platform, PlatformKind::WooCommerce);
    assert_eq!(records[0].title, "Sourdough Loaf");
    assert_eq!(records[0].price.as_deref(), Some("8.50"));
    assert_eq!(records[0].currency.as_deref(), Some("CAD"));
    assert_eq!(records[0].raw, product);
}

#[tokio::test]
async fn woocommerce_returns_minimal_products_verbatim() {
    let server = MockServer::start().await;
    let bare = json!({"id": 5, "name": "Gift Card"});
    let numeric = json!({"id": 6, "name": "Baguette", "prices": {"price": 375}});

    Mock::given(method("GET"))
        .and(path("/wp-json/wc/store/v1/products"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([bare.clone(), numeric.clone()])),
        )
        .mount(&server)
        .await;

    let adapter = WooCommerceAdapter::new(test_client());
    let records = adapter.extract(&server.uri()).await.expect("extract failed");

    let raw: Vec<_> = records.iter().map(|r| r.raw.clone()).collect();
    assert_eq!(raw, vec![bare, numeric]);
    assert!(records[0].price.is_none());
    assert_eq!(records[1].price.as_deref(), Some("3.75"));
}

#[tokio::test]
async fn woocommerce_forbidden_is_http_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wp-json/wc/store/v1/products"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let adapter = WooCommerceAdapter::new(test_client());
    let err = adapter.extract(&server.uri()).await.unwrap_err();
    assert!(matches!(err, CrawlError::HttpStatus { status: 403, .. }));
}
