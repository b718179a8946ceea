//! Checkout paths that end before PayPal is contacted.
//!
//! Run with `cargo test -p bazaar-api --test checkout -- --ignored`.

#![allow(clippy::expect_used)]

mod common;

use axum::http::StatusCode;
use rust_decimal::Decimal;

use bazaar_api::db::orders::OrderRepository;
use bazaar_api::error::AppError;
use bazaar_api::models::order::{CaptureRequest, CreateOrderRequest};
use bazaar_api::services::orders::OrderService;
use bazaar_core::{OrderId, PaymentStatus};

const CLIENT_URL: &str = "http://localhost:5173";

fn capture_request(order_id: OrderId, payment_id: &str) -> CaptureRequest {
    CaptureRequest {
        payment_id: payment_id.to_owned(),
        payer_id: "PAYER-TEST".to_owned(),
        order_id,
    }
}

fn expect_status(result: Result<impl std::fmt::Debug, AppError>, status: StatusCode) -> AppError {
    let err = result.expect_err("request should have been rejected");
    assert_eq!(err.status(), status, "unexpected error: {err}");
    err
}

// ============================================================================
// Capture
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL at BAZAAR_TEST_DATABASE_URL"]
async fn test_capture_unknown_order() {
    let pool = common::pool().await;
    let paypal = common::paypal();
    let shopper = common::shopper(&pool).await;

    let result = OrderService::new(&pool, &paypal, CLIENT_URL)
        .capture(&shopper, &capture_request(OrderId::new(i32::MAX), "PAY-NONE"))
        .await;
    expect_status(result, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL at BAZAAR_TEST_DATABASE_URL"]
async fn test_capture_other_users_order() {
    let pool = common::pool().await;
    let paypal = common::paypal();
    let owner = common::shopper(&pool).await;
    let intruder = common::shopper(&pool).await;
    let product = common::product(&pool, Decimal::new(1000, 2), 5).await;
    let order = common::pending_order(&pool, &owner, &[(&product, 1)]).await;
    let payment_id = order.payment_id.clone().expect("payment id");

    let result = OrderService::new(&pool, &paypal, CLIENT_URL)
        .capture(&intruder, &capture_request(order.id, &payment_id))
        .await;
    expect_status(result, StatusCode::FORBIDDEN);
    assert_eq!(common::stock_of(&pool, &product).await, 5);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL at BAZAAR_TEST_DATABASE_URL"]
async fn test_capture_already_paid_order() {
    let pool = common::pool().await;
    let paypal = common::paypal();
    let shopper = common::shopper(&pool).await;
    let product = common::product(&pool, Decimal::new(1000, 2), 5).await;
    let order = common::paid_order(&pool, &shopper, &[(&product, 1)]).await;
    let payment_id = order.payment_id.clone().expect("payment id");

    let result = OrderService::new(&pool, &paypal, CLIENT_URL)
        .capture(&shopper, &capture_request(order.id, &payment_id))
        .await;
    let err = expect_status(result, StatusCode::CONFLICT);
    assert_eq!(err.client_message(), "Order already paid");
}

#[tokio::test]
#[ignore = "Requires PostgreSQL at BAZAAR_TEST_DATABASE_URL"]
async fn test_capture_payment_id_mismatch() {
    let pool = common::pool().await;
    let paypal = common::paypal();
    let shopper = common::shopper(&pool).await;
    let product = common::product(&pool, Decimal::new(1000, 2), 5).await;
    let order = common::pending_order(&pool, &shopper, &[(&product, 1)]).await;

    let result = OrderService::new(&pool, &paypal, CLIENT_URL)
        .capture(&shopper, &capture_request(order.id, "PAY-SOMEONE-ELSE"))
        .await;
    expect_status(result, StatusCode::BAD_REQUEST);
    assert_eq!(common::stock_of(&pool, &product).await, 5);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL at BAZAAR_TEST_DATABASE_URL"]
async fn test_capture_short_stock_rolls_back_every_line() {
    let pool = common::pool().await;
    let paypal = common::paypal();
    let shopper = common::shopper(&pool).await;
    let plenty = common::product(&pool, Decimal::new(500, 2), 10).await;
    let also_plenty = common::product(&pool, Decimal::new(700, 2), 10).await;
    let scarce = common::product(&pool, Decimal::new(900, 2), 1).await;
    let order = common::pending_order(
        &pool,
        &shopper,
        &[(&plenty, 2), (&also_plenty, 3), (&scarce, 4)],
    )
    .await;
    let payment_id = order.payment_id.clone().expect("payment id");

    let result = OrderService::new(&pool, &paypal, CLIENT_URL)
        .capture(&shopper, &capture_request(order.id, &payment_id))
        .await;
    let err = expect_status(result, StatusCode::CONFLICT);
    assert_eq!(
        err.client_message(),
        format!("Not enough stock for product {}", scarce.title)
    );

    assert_eq!(common::stock_of(&pool, &plenty).await, 10);
    assert_eq!(common::stock_of(&pool, &also_plenty).await, 10);
    assert_eq!(common::stock_of(&pool, &scarce).await, 1);

    let stored = OrderRepository::new(&pool)
        .get(order.id)
        .await
        .expect("Failed to load order")
        .expect("order exists");
    assert_eq!(stored.payment_status, PaymentStatus::Pending);
    assert!(stored.payer_id.is_none());
}

// ============================================================================
// Place
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL at BAZAAR_TEST_DATABASE_URL"]
async fn test_place_with_someone_elses_address() {
    let pool = common::pool().await;
    let paypal = common::paypal();
    let shopper = common::shopper(&pool).await;
    let neighbour = common::shopper(&pool).await;
    let address = common::address(&pool, &neighbour).await;
    let product = common::product(&pool, Decimal::new(1000, 2), 5).await;

    let request: CreateOrderRequest = serde_json::from_value(serde_json::json!({
        "userId": shopper.id,
        "cartItems": [{ "productId": product.id, "quantity": 1 }],
        "addressInfo": { "addressId": address.id }
    }))
    .expect("valid order request");

    let result = OrderService::new(&pool, &paypal, CLIENT_URL)
        .place(&shopper, &request)
        .await;
    let err = expect_status(result, StatusCode::NOT_FOUND);
    assert_eq!(err.client_message(), "Address not found!");

    let orders = OrderRepository::new(&pool)
        .list_for_user(shopper.id)
        .await
        .expect("Failed to list orders");
    assert!(orders.is_empty());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL at BAZAAR_TEST_DATABASE_URL"]
async fn test_place_for_another_user() {
    let pool = common::pool().await;
    let paypal = common::paypal();
    let shopper = common::shopper(&pool).await;
    let other = common::shopper(&pool).await;
    let address = common::address(&pool, &other).await;
    let product = common::product(&pool, Decimal::new(1000, 2), 5).await;

    let request: CreateOrderRequest = serde_json::from_value(serde_json::json!({
        "userId": other.id,
        "cartItems": [{ "productId": product.id, "quantity": 1 }],
        "addressInfo": { "addressId": address.id }
    }))
    .expect("valid order request");

    let result = OrderService::new(&pool, &paypal, CLIENT_URL)
        .place(&shopper, &request)
        .await;
    expect_status(result, StatusCode::FORBIDDEN);
}
