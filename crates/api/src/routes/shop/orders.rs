//! Shopper order routes: checkout, PayPal capture and order history.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use tracing::instrument;

use bazaar_core::{OrderId, UserId};

use crate::db::orders::OrderRepository;
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::RequireAuth;
use crate::models::order::{CaptureRequest, CreateOrderRequest, Order};
use crate::response::ApiResponse;
use crate::services::orders::OrderService;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub success: bool,
    #[serde(rename = "approvalURL")]
    pub approval_url: String,
    pub order_id: OrderId,
}

/// `POST /api/shop/order`
#[instrument(skip(state, user, body))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(body): ApiJson<CreateOrderRequest>,
) -> Result<impl IntoResponse> {
    let placed = OrderService::new(state.pool(), state.paypal(), &state.config().client_url)
        .place(&user, &body)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateOrderResponse {
            success: true,
            approval_url: placed.approval_url,
            order_id: placed.order.id,
        }),
    ))
}

/// `POST /api/shop/order/capture`
#[instrument(skip(state, user, body))]
pub async fn capture(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(body): ApiJson<CaptureRequest>,
) -> Result<ApiResponse<Order>> {
    let order = OrderService::new(state.pool(), state.paypal(), &state.config().client_url)
        .capture(&user, &body)
        .await?;

    Ok(ApiResponse::ok(order).with_message("Order confirmed and stock updated"))
}

/// `GET /api/shop/order/user/{userId}`
#[instrument(skip(state, user))]
pub async fn list_for_user(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(user_id): ApiPath<UserId>,
) -> Result<ApiResponse<Vec<Order>>> {
    user.ensure_can_access(user_id)?;

    let orders = OrderRepository::new(state.pool())
        .list_for_user(user_id)
        .await?;
    let empty = orders.is_empty();
    let response = ApiResponse::ok(orders);
    Ok(if empty {
        response.with_message("No orders found")
    } else {
        response
    })
}

/// `GET /api/shop/order/{id}`
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<OrderId>,
) -> Result<ApiResponse<Order>> {
    let order = OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))?;
    user.ensure_can_access(order.user_id)?;

    Ok(ApiResponse::ok(order))
}
