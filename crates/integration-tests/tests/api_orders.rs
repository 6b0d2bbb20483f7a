//! Integration tests for checkout and order history.

use axum::http::{Method, StatusCode};
use cloudmart_integration_tests::TestApp;
use serde_json::{Value, json};

#[tokio::test]
async fn test_checkout_scenario() {
    let app = TestApp::seeded().await;
    app.request(
        Method::POST,
        "/api/v1/cart/items",
        Some(json!({"product_id": "1", "quantity": 2})),
    )
    .await;

    let (status, order) = app.request(Method::POST, "/api/v1/orders", None).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order.get("user_id"), Some(&json!("demo_user")));
    assert_eq!(
        order.get("items"),
        Some(&json!([{"product_id": "1", "quantity": 2}]))
    );
    assert_eq!(order.get("status"), Some(&json!("confirmed")));
    assert!(order.get("id").and_then(Value::as_str).is_some());
    assert!(order.get("created_at").and_then(Value::as_str).is_some());

    let (_, cart) = app.get("/api/v1/cart").await;
    assert_eq!(cart, json!([]));

    let (status, orders) = app.get("/api/v1/orders").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(orders, json!([order]));
}

#[tokio::test]
async fn test_checkout_with_empty_cart_is_rejected() {
    let app = TestApp::seeded().await;

    let (status, body) = app.request(Method::POST, "/api/v1/orders", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("error").and_then(Value::as_str).is_some());

    let (_, orders) = app.get("/api/v1/orders").await;
    assert_eq!(orders, json!([]));
}

#[tokio::test]
async fn test_order_keeps_every_cart_line() {
    let app = TestApp::seeded().await;
    for (product_id, quantity) in [("2", 1), ("5", 3), ("8", 2)] {
        app.request(
            Method::POST,
            "/api/v1/cart/items",
            Some(json!({"product_id": product_id, "quantity": quantity})),
        )
        .await;
    }

    let (_, order) = app.request(Method::POST, "/api/v1/orders", None).await;

    assert_eq!(
        order.get("items"),
        Some(&json!([
            {"product_id": "2", "quantity": 1},
            {"product_id": "5", "quantity": 3},
            {"product_id": "8", "quantity": 2}
        ]))
    );
    assert_eq!(
        order
            .get("source_cart_item_ids")
            .and_then(Value::as_array)
            .map(Vec::len),
        Some(3)
    );
}
