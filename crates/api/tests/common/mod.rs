//! Database fixtures for service-level tests.
//!
//! Tests using these helpers are `#[ignore]`d and need a disposable
//! `PostgreSQL` database in `BAZAAR_TEST_DATABASE_URL`. Migrations are applied
//! on connect; every fixture uses fresh rows so tests can share the database.

#![allow(dead_code, clippy::expect_used)]

use rust_decimal::Decimal;
use secrecy::SecretString;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use bazaar_api::config::{PaypalConfig, PaypalMode};
use bazaar_api::db::addresses::AddressRepository;
use bazaar_api::db::orders::{self, NewOrder, OrderRepository};
use bazaar_api::db::products::ProductRepository;
use bazaar_api::db::users::UserRepository;
use bazaar_api::models::CurrentUser;
use bazaar_api::models::address::{Address, NewAddress};
use bazaar_api::models::order::{AddressInfo, Order, OrderItem};
use bazaar_api::models::product::{NewProduct, Product};
use bazaar_api::services::paypal::PaypalClient;
use bazaar_core::{Email, PaymentMethod, UserRole, line_total};

/// Connect to the test database and apply migrations.
pub async fn pool() -> PgPool {
    let url = std::env::var("BAZAAR_TEST_DATABASE_URL")
        .expect("BAZAAR_TEST_DATABASE_URL must point at a disposable database");
    let pool = PgPoolOptions::new()
        .max_connections(20)
        .connect(&url)
        .await
        .expect("Failed to connect to test database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

/// A PayPal client for flows that must fail before any PayPal call.
pub fn paypal() -> PaypalClient {
    PaypalClient::new(&PaypalConfig {
        mode: PaypalMode::Sandbox,
        client_id: "test-client".to_owned(),
        client_secret: SecretString::from("test-secret"),
    })
    .expect("Failed to build PayPal client")
}

async fn user_with_role(pool: &PgPool, role: UserRole) -> CurrentUser {
    let email = Email::parse(&format!("{}@example.com", Uuid::new_v4().simple()))
        .expect("valid email");
    let user = UserRepository::new(pool)
        .create("Test Shopper", &email, "unused-hash", role)
        .await
        .expect("Failed to create user");
    CurrentUser::from(&user)
}

pub async fn shopper(pool: &PgPool) -> CurrentUser {
    user_with_role(pool, UserRole::User).await
}

pub async fn admin(pool: &PgPool) -> CurrentUser {
    user_with_role(pool, UserRole::Admin).await
}

pub async fn product(pool: &PgPool, price: Decimal, stock: i32) -> Product {
    ProductRepository::new(pool)
        .create(&NewProduct {
            image: None,
            title: format!("Product {}", Uuid::new_v4().simple()),
            description: String::new(),
            category: "test".to_owned(),
            brand: "test".to_owned(),
            price,
            sale_price: None,
            total_stock: stock,
            average_review: 0.0,
        })
        .await
        .expect("Failed to create product")
}

pub async fn stock_of(pool: &PgPool, product: &Product) -> i32 {
    ProductRepository::new(pool)
        .get(product.id)
        .await
        .expect("Failed to load product")
        .expect("product exists")
        .total_stock
}

pub async fn address(pool: &PgPool, user: &CurrentUser) -> Address {
    AddressRepository::new(pool)
        .create(
            user.id,
            &NewAddress {
                address: "1 Market Street".to_owned(),
                city: "Springfield".to_owned(),
                pincode: "12345".to_owned(),
                phone: "555-0100".to_owned(),
                notes: None,
            },
        )
        .await
        .expect("Failed to create address")
}

/// Store a pending order as if PayPal had issued `PAY-<uuid>`.
pub async fn pending_order(pool: &PgPool, user: &CurrentUser, lines: &[(&Product, i32)]) -> Order {
    let items: Vec<OrderItem> = lines
        .iter()
        .map(|(product, quantity)| OrderItem {
            product_id: product.id,
            title: product.title.clone(),
            image: product.image.clone(),
            price: product.unit_price(),
            quantity: *quantity,
        })
        .collect();
    let total_amount = items
        .iter()
        .map(|item| line_total(item.price, item.quantity))
        .sum();

    OrderRepository::new(pool)
        .create(&NewOrder {
            user_id: user.id,
            cart_id: None,
            address: AddressInfo {
                address_id: None,
                address: "1 Market Street".to_owned(),
                city: "Springfield".to_owned(),
                pincode: "12345".to_owned(),
                phone: "555-0100".to_owned(),
                notes: None,
            },
            items,
            total_amount,
            payment_method: PaymentMethod::Paypal,
            payment_id: format!("PAY-{}", Uuid::new_v4().simple()),
        })
        .await
        .expect("Failed to create order")
}

/// Store an order whose payment has completed.
pub async fn paid_order(pool: &PgPool, user: &CurrentUser, lines: &[(&Product, i32)]) -> Order {
    let order = pending_order(pool, user, lines).await;
    let payment_id = order.payment_id.clone().expect("pending order has a payment id");
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    orders::mark_paid(&mut *conn, order.id, &payment_id, "PAYER-TEST")
        .await
        .expect("Failed to mark order paid")
}
