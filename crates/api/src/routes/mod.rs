//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Auth (register/login/forgot/reset are rate limited)
//! POST /api/auth/register
//! POST /api/auth/login
//! POST /api/auth/logout
//! GET  /api/auth/check-auth
//! POST /api/auth/forgot-password
//! POST /api/auth/reset-password
//!
//! # Users (admin)
//! GET  /api/users
//!
//! # Upload (admin)
//! POST /api/upload/upload-image
//!
//! # Admin
//! GET    /api/admin/products
//! POST   /api/admin/products/upload-image
//! POST   /api/admin/products/add
//! PUT    /api/admin/products/edit/{id}
//! DELETE /api/admin/products/delete/{id}
//! GET    /api/admin/orders
//! GET    /api/admin/orders/{id}
//! PUT    /api/admin/orders/{id}
//! POST   /api/admin/feature/add
//! GET    /api/admin/feature/all            (public)
//! DELETE /api/admin/feature/{id}
//!
//! # Shop
//! GET    /api/shop/products
//! GET    /api/shop/products/{id}
//! POST   /api/shop/cart/add
//! GET    /api/shop/cart/get/{userId}
//! PUT    /api/shop/cart/update-cart
//! DELETE /api/shop/cart/delete/{userId}/{productId}
//! POST   /api/shop/address/add/{userId}
//! GET    /api/shop/address/get/{userId}
//! PUT    /api/shop/address/update/{userId}/{addressId}
//! DELETE /api/shop/address/delete/{userId}/{addressId}
//! POST   /api/shop/order
//! POST   /api/shop/order/capture
//! GET    /api/shop/order/user/{userId}
//! GET    /api/shop/order/{id}
//! POST   /api/shop/review
//! GET    /api/shop/review/{productId}
//! PUT    /api/shop/review/{reviewId}
//! DELETE /api/shop/review/{reviewId}
//! GET    /api/shop/search/{keyword}
//! GET    /api/shop/search/suggestions/{keyword}
//! ```

pub mod admin;
pub mod auth;
pub mod shop;
pub mod upload;
pub mod users;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::map_response,
    routing::{delete, get, post, put},
};

use crate::middleware::{auth_rate_limiter, rate_limit_envelope};
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    let limited = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password", post(auth::reset_password))
        .layer(auth_rate_limiter())
        .layer(map_response(rate_limit_envelope));

    Router::new()
        .route("/logout", post(auth::logout))
        .route("/check-auth", get(auth::check_auth))
        .merge(limited)
}

/// Image upload route with a raised body limit.
fn upload_route() -> Router<AppState> {
    Router::new()
        .route("/upload-image", post(upload::upload_image))
        .layer(DefaultBodyLimit::max(upload::MAX_UPLOAD_BYTES))
}

/// Create the admin product routes router.
pub fn admin_product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::products::list))
        .route("/add", post(admin::products::add))
        .route("/edit/{id}", put(admin::products::edit))
        .route("/delete/{id}", delete(admin::products::remove))
        .merge(upload_route())
}

/// Create the admin order routes router.
pub fn admin_order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::orders::list))
        .route(
            "/{id}",
            get(admin::orders::show).put(admin::orders::update_status),
        )
}

/// Create the feature banner routes router.
pub fn feature_routes() -> Router<AppState> {
    Router::new()
        .route("/add", post(admin::features::add))
        .route("/all", get(admin::features::list))
        .route("/{id}", delete(admin::features::remove))
}

/// Create the shop product routes router.
pub fn shop_product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(shop::products::list))
        .route("/{id}", get(shop::products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/add", post(shop::cart::add))
        .route("/get/{user_id}", get(shop::cart::show))
        .route("/update-cart", put(shop::cart::update))
        .route("/delete/{user_id}/{product_id}", delete(shop::cart::remove))
}

/// Create the address routes router.
pub fn address_routes() -> Router<AppState> {
    Router::new()
        .route("/add/{user_id}", post(shop::address::add))
        .route("/get/{user_id}", get(shop::address::list))
        .route(
            "/update/{user_id}/{address_id}",
            put(shop::address::update),
        )
        .route(
            "/delete/{user_id}/{address_id}",
            delete(shop::address::remove),
        )
}

/// Create the shop order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(shop::orders::create))
        .route("/capture", post(shop::orders::capture))
        .route("/user/{user_id}", get(shop::orders::list_for_user))
        .route("/{id}", get(shop::orders::show))
}

/// Create the review routes router.
///
/// `{id}` is a product id for `GET` and a review id for `PUT`/`DELETE`.
pub fn review_routes() -> Router<AppState> {
    Router::new().route("/", post(shop::reviews::create)).route(
        "/{id}",
        get(shop::reviews::list)
            .put(shop::reviews::update)
            .delete(shop::reviews::remove),
    )
}

/// Create the search routes router.
pub fn search_routes() -> Router<AppState> {
    Router::new()
        .route("/{keyword}", get(shop::search::search))
        .route("/suggestions/{keyword}", get(shop::search::suggestions))
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth_routes())
        .route("/api/users", get(users::list))
        .nest("/api/upload", upload_route())
        .nest("/api/admin/products", admin_product_routes())
        .nest("/api/admin/orders", admin_order_routes())
        .nest("/api/admin/feature", feature_routes())
        .nest("/api/shop/products", shop_product_routes())
        .nest("/api/shop/cart", cart_routes())
        .nest("/api/shop/address", address_routes())
        .nest("/api/shop/order", order_routes())
        .nest("/api/shop/review", review_routes())
        .nest("/api/shop/search", search_routes())
}
