//! Cart route handlers. Callers may only touch their own cart unless admin.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use bazaar_core::{ProductId, UserId};

use crate::db::carts::CartRepository;
use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::RequireAuth;
use crate::models::cart::{CartItemView, CartLineRequest, CartView};
use crate::response::ApiResponse;
use crate::state::AppState;

const INVALID_DATA: &str = "Invalid data provided!";
const CART_NOT_FOUND: &str = "Cart not found!";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartResponse {
    pub success: bool,
    pub cart_item: CartItemView,
}

/// `POST /api/shop/cart/add`
#[instrument(skip(state, user), fields(user_id = %body.user_id, product_id = %body.product_id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(body): ApiJson<CartLineRequest>,
) -> Result<Json<AddToCartResponse>> {
    user.ensure_can_access(body.user_id)?;
    body.validate_quantity(1)?;

    if ProductRepository::new(state.pool())
        .get(body.product_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("Product not found".to_owned()));
    }

    let carts = CartRepository::new(state.pool());
    let cart_id = carts.get_or_create(body.user_id).await?;
    let cart_item = carts
        .add_item(cart_id, body.product_id, body.quantity)
        .await?
        .ok_or_else(|| AppError::BadRequest(INVALID_DATA.to_owned()))?;

    Ok(Json(AddToCartResponse {
        success: true,
        cart_item,
    }))
}

/// `GET /api/shop/cart/get/{userId}`
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(user_id): ApiPath<UserId>,
) -> Result<ApiResponse<CartView>> {
    user.ensure_can_access(user_id)?;
    let cart = CartRepository::new(state.pool())
        .view_for_user(user_id)
        .await?;
    Ok(ApiResponse::ok(cart))
}

/// `PUT /api/shop/cart/update-cart` - set a line's quantity; zero removes it.
#[instrument(skip(state, user), fields(user_id = %body.user_id, product_id = %body.product_id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(body): ApiJson<CartLineRequest>,
) -> Result<ApiResponse<CartView>> {
    user.ensure_can_access(body.user_id)?;
    body.validate_quantity(0)?;

    let carts = CartRepository::new(state.pool());
    let cart_id = carts
        .cart_id_for_user(body.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(CART_NOT_FOUND.to_owned()))?;

    if !carts
        .set_quantity(cart_id, body.product_id, body.quantity)
        .await?
    {
        return Err(AppError::NotFound("Cart item not present!".to_owned()));
    }

    Ok(ApiResponse::ok(carts.view_for_user(body.user_id).await?))
}

/// `DELETE /api/shop/cart/delete/{userId}/{productId}`
#[instrument(skip(state, user))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath((user_id, product_id)): ApiPath<(UserId, ProductId)>,
) -> Result<ApiResponse<CartView>> {
    user.ensure_can_access(user_id)?;

    let carts = CartRepository::new(state.pool());
    let cart_id = carts
        .cart_id_for_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(CART_NOT_FOUND.to_owned()))?;
    carts.remove_item(cart_id, product_id).await?;

    Ok(ApiResponse::ok(carts.view_for_user(user_id).await?))
}
