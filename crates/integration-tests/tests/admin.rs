//! Product editor endpoints.

#![allow(clippy::unwrap_used)]

use serde_json::json;

use huerto_integration_tests::{TestApp, json_body, new_client};

#[tokio::test]
async fn test_admin_routes_require_admin() {
    let app = TestApp::spawn().await;

    let response = app.get(&new_client(), "/api/admin/products").await;
    assert_eq!(response.status(), 401);

    let customer = app.customer("ana@example.cl").await;
    let response = app.get(&customer, "/api/admin/products").await;
    assert_eq!(response.status(), 403);
    assert_eq!(
        json_body(response).await["error"],
        "Administrator access required"
    );

    let response = app
        .post(
            &customer,
            "/api/admin/products",
            &json!({ "name": "Palta Hass", "price": 2500 }),
        )
        .await;
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn test_create_update_delete_product() {
    let app = TestApp::spawn().await;
    app.catalog_loaded().await;
    let admin = app.admin().await;

    let listing = json_body(app.get(&admin, "/api/admin/products").await).await;
    assert_eq!(listing["products"].as_array().unwrap().len(), 6);

    let response = app
        .post(
            &admin,
            "/api/admin/products",
            &json!({ "name": "Palta Hass", "price": "2500", "category": "Fruta" }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let created = json_body(response).await;
    assert_eq!(created["id"], 7);
    assert_eq!(created["stock"], 100);
    assert_eq!(created["origin"], "Local");

    // The public catalog already shows the new product
    let body = json_body(app.get(&app.client, "/api/products?category=Fruta").await).await;
    assert_eq!(body["products"].as_array().unwrap().len(), 3);

    let response = admin
        .put(app.url("/api/admin/products/7"))
        .json(&json!({ "name": "Palta Hass", "price": 2300, "stock": 40 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(json_body(response).await["stock"], 40);

    let selected = json_body(app.get(&admin, "/api/admin/products/7").await).await;
    assert_eq!(selected["stock"], 40);
    let state = json_body(app.get(&admin, "/api/admin/products").await).await;
    assert_eq!(state["selected"]["id"], 7);

    let response = admin
        .delete(app.url("/api/admin/products/7"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    let state = json_body(app.get(&admin, "/api/admin/products").await).await;
    assert!(state["selected"].is_null());
    assert_eq!(state["products"].as_array().unwrap().len(), 6);

    let response = admin
        .delete(app.url("/api/admin/products/7"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
    assert_eq!(
        app.get(&app.client, "/api/products/7").await.status(),
        404
    );
}

#[tokio::test]
async fn test_invalid_product_input() {
    let app = TestApp::spawn().await;
    let admin = app.admin().await;

    let response = app
        .post(&admin, "/api/admin/products", &json!({ "name": "  ", "price": 100 }))
        .await;
    assert_eq!(response.status(), 400);
    assert_eq!(json_body(response).await["error"], "product name is required");

    let response = app
        .post(&admin, "/api/admin/products", &json!({ "name": "Tomate", "price": -1 }))
        .await;
    assert_eq!(response.status(), 400);
    assert_eq!(json_body(response).await["error"], "price cannot be negative");

    let response = app
        .post(
            &admin,
            "/api/admin/products",
            &json!({ "name": "Trufa", "price": "1000000000000" }),
        )
        .await;
    assert_eq!(response.status(), 400);
    assert_eq!(
        json_body(response).await["error"],
        "price cannot exceed 1000000000"
    );

    let response = admin
        .put(app.url("/api/admin/products/999"))
        .json(&json!({ "name": "Tomate", "price": 100 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}
