//! Integration tests for ownership and admin access control.
//!
//! Admin tests need `BAZAAR_ADMIN_EMAIL` and `BAZAAR_ADMIN_PASSWORD`.

#![allow(clippy::expect_used)]

use bazaar_integration_tests::{client, signed_in_admin, signed_in_shopper, url};
use reqwest::StatusCode;
use serde_json::{Value, json};

// ============================================================================
// Anonymous and Cross-User Access
// ============================================================================

#[tokio::test]
#[ignore = "Requires running bazaar-api server and seeded database"]
async fn test_anonymous_requests_are_unauthorized() {
    let client = client();
    for path in ["/api/shop/cart/get/1", "/api/shop/address/get/1", "/api/admin/orders"] {
        let resp = client
            .get(url(path))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{path}");

        let body: Value = resp.json().await.expect("Failed to parse response");
        assert_eq!(body["success"], false);
    }
}

#[tokio::test]
#[ignore = "Requires running bazaar-api server and seeded database"]
async fn test_shopper_cannot_read_another_cart() {
    let alice = client();
    let bob = client();
    let alice_user = signed_in_shopper(&alice).await;
    signed_in_shopper(&bob).await;

    let resp = bob
        .get(url(&format!("/api/shop/cart/get/{}", alice_user["id"])))
        .send()
        .await
        .expect("Failed to get cart");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires running bazaar-api server and seeded database"]
async fn test_shopper_cannot_use_admin_routes() {
    let client = client();
    signed_in_shopper(&client).await;

    let resp = client
        .get(url("/api/admin/orders"))
        .send()
        .await
        .expect("Failed to list orders");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = client
        .post(url("/api/admin/products/add"))
        .json(&json!({ "title": "Sneaky", "price": "1.00" }))
        .send()
        .await
        .expect("Failed to add product");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

// ============================================================================
// Admin Operations
// ============================================================================

#[tokio::test]
#[ignore = "Requires running bazaar-api server and seeded database"]
async fn test_admin_product_lifecycle() {
    let client = client();
    signed_in_admin(&client).await;

    let resp = client
        .post(url("/api/admin/products/add"))
        .json(&json!({
            "title": "Integration Test Mug",
            "description": "Holds coffee",
            "category": "kitchen",
            "brand": "acme",
            "price": "12.50",
            "salePrice": "10.00",
            "totalStock": 3
        }))
        .send()
        .await
        .expect("Failed to add product");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("Failed to parse response");
    let id = body["data"]["id"].as_i64().expect("product id");

    let resp = client
        .put(url(&format!("/api/admin/products/edit/{id}")))
        .json(&json!({ "totalStock": 9 }))
        .send()
        .await
        .expect("Failed to edit product");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["totalStock"], 9);
    assert_eq!(body["data"]["title"], "Integration Test Mug");

    let resp = client
        .delete(url(&format!("/api/admin/products/delete/{id}")))
        .send()
        .await
        .expect("Failed to delete product");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .delete(url(&format!("/api/admin/products/delete/{id}")))
        .send()
        .await
        .expect("Failed to delete product");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running bazaar-api server and seeded database"]
async fn test_admin_feature_banners() {
    let client = client();
    signed_in_admin(&client).await;

    let resp = client
        .post(url("/api/admin/feature/add"))
        .json(&json!({ "image": "https://res.cloudinary.com/demo/image/upload/banner.jpg" }))
        .send()
        .await
        .expect("Failed to add feature");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("Failed to parse response");
    let id = body["data"]["id"].clone();

    let body: Value = client
        .get(url("/api/admin/feature/all"))
        .send()
        .await
        .expect("Failed to list features")
        .json()
        .await
        .expect("Failed to parse response");
    let listed = body["data"].as_array().expect("data array");
    assert!(listed.iter().any(|f| f["id"] == id));

    let resp = client
        .delete(url(&format!("/api/admin/feature/{id}")))
        .send()
        .await
        .expect("Failed to delete feature");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running bazaar-api server and seeded database"]
async fn test_admin_order_status_for_missing_order() {
    let client = client();
    signed_in_admin(&client).await;

    let resp = client
        .put(url("/api/admin/orders/2147483000"))
        .json(&json!({ "orderStatus": "shipped" }))
        .send()
        .await
        .expect("Failed to update order");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
