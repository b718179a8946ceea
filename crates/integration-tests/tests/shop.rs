//! Integration tests for the shopper-facing catalogue, cart and addresses.
//!
//! Requires a running API server with at least one seeded product.

#![allow(clippy::expect_used)]

use bazaar_integration_tests::{any_product_id, client, signed_in_shopper, url};
use reqwest::StatusCode;
use serde_json::{Value, json};

// ============================================================================
// Catalogue
// ============================================================================

#[tokio::test]
#[ignore = "Requires running bazaar-api server and seeded database"]
async fn test_product_listing_sorted_by_price() {
    let client = client();
    let resp = client
        .get(url("/api/shop/products?sortBy=price-lowtohigh"))
        .send()
        .await
        .expect("Failed to list products");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse response");
    let prices: Vec<f64> = body["data"]
        .as_array()
        .expect("data should be an array")
        .iter()
        .filter_map(|p| p["price"].as_str()?.parse().ok())
        .collect();
    assert!(prices.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
#[ignore = "Requires running bazaar-api server and seeded database"]
async fn test_product_details() {
    let client = client();
    let id = any_product_id(&client).await;

    let resp = client
        .get(url(&format!("/api/shop/products/{id}")))
        .send()
        .await
        .expect("Failed to get product");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["id"], id);

    let resp = client
        .get(url("/api/shop/products/2147483000"))
        .send()
        .await
        .expect("Failed to get product");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running bazaar-api server and seeded database"]
async fn test_search_paginates() {
    let resp = client()
        .get(url("/api/shop/search/a?page=1&limit=2"))
        .send()
        .await
        .expect("Failed to search");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse response");
    assert!(body["data"].as_array().expect("data array").len() <= 2);
    assert!(body["total"].as_i64().is_some());
}

// ============================================================================
// Cart
// ============================================================================

#[tokio::test]
#[ignore = "Requires running bazaar-api server and seeded database"]
async fn test_cart_lifecycle() {
    let client = client();
    let user = signed_in_shopper(&client).await;
    let user_id = user["id"].as_i64().expect("user id");
    let product_id = any_product_id(&client).await;

    let resp = client
        .get(url(&format!("/api/shop/cart/get/{user_id}")))
        .send()
        .await
        .expect("Failed to get cart");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["items"], json!([]));

    for _ in 0..2 {
        let resp = client
            .post(url("/api/shop/cart/add"))
            .json(&json!({ "userId": user_id, "productId": product_id, "quantity": 1 }))
            .send()
            .await
            .expect("Failed to add to cart");
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let body: Value = client
        .get(url(&format!("/api/shop/cart/get/{user_id}")))
        .send()
        .await
        .expect("Failed to get cart")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(body["data"]["items"][0]["quantity"], 2);

    let resp = client
        .put(url("/api/shop/cart/update-cart"))
        .json(&json!({ "userId": user_id, "productId": product_id, "quantity": 5 }))
        .send()
        .await
        .expect("Failed to update cart");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["items"][0]["quantity"], 5);

    let resp = client
        .delete(url(&format!("/api/shop/cart/delete/{user_id}/{product_id}")))
        .send()
        .await
        .expect("Failed to remove from cart");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["items"], json!([]));
}

#[tokio::test]
#[ignore = "Requires running bazaar-api server and seeded database"]
async fn test_cart_rejects_zero_quantity() {
    let client = client();
    let user = signed_in_shopper(&client).await;
    let product_id = any_product_id(&client).await;

    let resp = client
        .post(url("/api/shop/cart/add"))
        .json(&json!({ "userId": user["id"], "productId": product_id, "quantity": 0 }))
        .send()
        .await
        .expect("Failed to add to cart");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Addresses
// ============================================================================

#[tokio::test]
#[ignore = "Requires running bazaar-api server and seeded database"]
async fn test_address_lifecycle() {
    let client = client();
    let user = signed_in_shopper(&client).await;
    let user_id = user["id"].as_i64().expect("user id");

    let resp = client
        .post(url(&format!("/api/shop/address/add/{user_id}")))
        .json(&json!({
            "address": "1 Market Street",
            "city": "Springfield",
            "pincode": "12345",
            "phone": "555-0100",
            "notes": "Ring twice"
        }))
        .send()
        .await
        .expect("Failed to add address");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("Failed to parse response");
    let address_id = body["data"]["id"].as_i64().expect("address id");

    let resp = client
        .put(url(&format!("/api/shop/address/update/{user_id}/{address_id}")))
        .json(&json!({ "city": "Shelbyville" }))
        .send()
        .await
        .expect("Failed to update address");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["city"], "Shelbyville");
    assert_eq!(body["data"]["pincode"], "12345");

    let resp = client
        .delete(url(&format!("/api/shop/address/delete/{user_id}/{address_id}")))
        .send()
        .await
        .expect("Failed to delete address");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = client
        .get(url(&format!("/api/shop/address/get/{user_id}")))
        .send()
        .await
        .expect("Failed to list addresses")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
#[ignore = "Requires running bazaar-api server and seeded database"]
async fn test_address_requires_fields() {
    let client = client();
    let user = signed_in_shopper(&client).await;
    let user_id = user["id"].as_i64().expect("user id");

    let resp = client
        .post(url(&format!("/api/shop/address/add/{user_id}")))
        .json(&json!({ "address": "1 Market Street", "city": "" }))
        .send()
        .await
        .expect("Failed to add address");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Reviews and Orders
// ============================================================================

#[tokio::test]
#[ignore = "Requires running bazaar-api server and seeded database"]
async fn test_review_requires_purchase() {
    let client = client();
    let user = signed_in_shopper(&client).await;
    let product_id = any_product_id(&client).await;

    let resp = client
        .post(url("/api/shop/review"))
        .json(&json!({
            "productId": product_id,
            "userId": user["id"],
            "userName": user["userName"],
            "reviewMessage": "Lovely",
            "reviewValue": 5
        }))
        .send()
        .await
        .expect("Failed to post review");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires running bazaar-api server and seeded database"]
async fn test_new_shopper_has_no_orders() {
    let client = client();
    let user = signed_in_shopper(&client).await;
    let user_id = user["id"].as_i64().expect("user id");

    let resp = client
        .get(url(&format!("/api/shop/order/user/{user_id}")))
        .send()
        .await
        .expect("Failed to list orders");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["data"], json!([]));
}
