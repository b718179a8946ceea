//! End-to-end tests for the Bazaar API.
//!
//! # Running Tests
//!
//! ```bash
//! cargo run -p bazaar-cli -- migrate
//! cargo run -p bazaar-cli -- seed products catalogue.yaml
//! cargo run -p bazaar-cli -- admin create -e "$BAZAAR_ADMIN_EMAIL" -n Admin -p "$BAZAAR_ADMIN_PASSWORD"
//! cargo run -p bazaar-api &
//! cargo test -p bazaar-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `BAZAAR_API_URL` - Server under test (default: <http://localhost:5000>)
//! - `BAZAAR_ADMIN_EMAIL`, `BAZAAR_ADMIN_PASSWORD` - Admin account for admin tests
//!
//! Each client sends its own `X-Forwarded-For` address so the per-IP login
//! rate limit does not trip across tests.

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL of the server under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("BAZAAR_API_URL").unwrap_or_else(|_| "http://localhost:5000".to_string())
}

/// Absolute URL for an API path.
#[must_use]
pub fn url(path: &str) -> String {
    format!("{}{path}", base_url())
}

/// A cookie-keeping client with its own forwarded client address.
#[must_use]
pub fn client() -> Client {
    let id = Uuid::new_v4();
    let [a, b, c, ..] = *id.as_bytes();
    let mut headers = HeaderMap::new();
    headers.insert(
        "x-forwarded-for",
        HeaderValue::from_str(&format!("10.{a}.{b}.{c}")).expect("valid header value"),
    );

    Client::builder()
        .cookie_store(true)
        .default_headers(headers)
        .build()
        .expect("Failed to create HTTP client")
}

/// A unique throwaway email address.
#[must_use]
pub fn unique_email() -> String {
    format!("shopper-{}@example.com", Uuid::new_v4().simple())
}

/// Log `client` in and return the `user` object.
pub async fn login(client: &Client, email: &str, password: &str) -> Value {
    let resp = client
        .post(url("/api/auth/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to log in");
    assert!(resp.status().is_success(), "login failed: {}", resp.status());

    let body: Value = resp.json().await.expect("Failed to parse login response");
    body["user"].clone()
}

/// Register a fresh shopper, log in with `client`, and return the `user` object.
pub async fn signed_in_shopper(client: &Client) -> Value {
    let email = unique_email();
    let password = "correct-horse-battery";

    let resp = client
        .post(url("/api/auth/register"))
        .json(&json!({ "userName": "Test Shopper", "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status().as_u16(), 201);

    login(client, &email, password).await
}

/// Log `client` in as the configured admin.
pub async fn signed_in_admin(client: &Client) -> Value {
    let email = std::env::var("BAZAAR_ADMIN_EMAIL").expect("BAZAAR_ADMIN_EMAIL not set");
    let password = std::env::var("BAZAAR_ADMIN_PASSWORD").expect("BAZAAR_ADMIN_PASSWORD not set");
    login(client, &email, &password).await
}

/// Id of any product in the catalogue.
pub async fn any_product_id(client: &Client) -> i64 {
    let body: Value = client
        .get(url("/api/shop/products"))
        .send()
        .await
        .expect("Failed to list products")
        .json()
        .await
        .expect("Failed to parse product list");

    body["data"]
        .as_array()
        .and_then(|products| products.first())
        .and_then(|p| p["id"].as_i64())
        .expect("catalogue is empty; seed products first")
}
