//! Catalog endpoints against a freshly seeded database.

#![allow(clippy::unwrap_used)]

use huerto_integration_tests::{TestApp, json_body, new_client};

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::spawn().await;
    let client = new_client();

    let response = app.get(&client, "/health").await;
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "ok");

    let response = app.get(&client, "/health/ready").await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_empty_catalog_is_seeded() {
    let app = TestApp::spawn().await;
    app.catalog_loaded().await;

    let body = json_body(app.get(&app.client, "/api/products").await).await;
    let products = body["products"].as_array().unwrap();
    assert_eq!(products.len(), 6);
    assert_eq!(products[0]["name"], "Manzana Fuji");
    assert_eq!(body["loading"], false);
    assert!(body["error"].is_null());
}

#[tokio::test]
async fn test_seeding_can_be_disabled() {
    let app = TestApp::spawn_with(&[("STOREFRONT_SEED_CATALOG", "false")]).await;
    app.catalog_loaded().await;

    let body = json_body(app.get(&app.client, "/api/products").await).await;
    assert!(body["products"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_category_filter() {
    let app = TestApp::spawn().await;
    app.catalog_loaded().await;

    let body = json_body(app.get(&app.client, "/api/products?category=Fruta").await).await;
    let names: Vec<&str> = body["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Manzana Fuji", "Plátano"]);

    let body = json_body(app.get(&app.client, "/api/products?category=Lácteos").await).await;
    assert!(body["products"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_product_detail() {
    let app = TestApp::spawn().await;
    app.catalog_loaded().await;

    let response = app.get(&app.client, "/api/products/2").await;
    assert_eq!(response.status(), 200);
    let product = json_body(response).await;
    assert_eq!(product["name"], "Plátano");
    assert_eq!(product["stock"], 150);

    let response = app.get(&app.client, "/api/products/999").await;
    assert_eq!(response.status(), 404);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Not found: product 999");
}

#[tokio::test]
async fn test_stream_sends_current_catalog_first() {
    let app = TestApp::spawn().await;
    app.catalog_loaded().await;

    let mut response = app.get(&app.client, "/api/products/stream").await;
    assert_eq!(response.status(), 200);
    assert!(
        response.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/event-stream")
    );

    let chunk = response.chunk().await.unwrap().unwrap();
    let text = String::from_utf8_lossy(&chunk);
    assert!(text.contains("event: catalog"));
    assert!(text.contains("Manzana Fuji"));
}
