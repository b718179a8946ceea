//! Admin order management.

use axum::extract::State;
use tracing::instrument;

use bazaar_core::OrderId;

use crate::db::orders::OrderRepository;
use crate::error::{AppError, Result, not_found_as};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::RequireAdmin;
use crate::models::order::{Order, OrderStatusUpdate};
use crate::response::ApiResponse;
use crate::state::AppState;

const ORDER_NOT_FOUND: &str = "Order not found!";

/// `GET /api/admin/orders`
#[instrument(skip(state, _admin))]
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<ApiResponse<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool()).list_all().await?;
    Ok(ApiResponse::ok(orders).with_message("Orders fetched successfully"))
}

/// `GET /api/admin/orders/{id}`
#[instrument(skip(state, _admin))]
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiPath(id): ApiPath<OrderId>,
) -> Result<ApiResponse<Order>> {
    let order = OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(ORDER_NOT_FOUND.to_owned()))?;
    Ok(ApiResponse::ok(order).with_message("Order details fetched successfully"))
}

/// `PUT /api/admin/orders/{id}`
#[instrument(skip(state, admin, body), fields(admin_id = %admin.id))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<OrderId>,
    ApiJson(body): ApiJson<OrderStatusUpdate>,
) -> Result<ApiResponse<Order>> {
    let status = body.parse()?;

    let order = OrderRepository::new(state.pool())
        .update_status(id, status)
        .await
        .map_err(not_found_as(ORDER_NOT_FOUND))?;

    tracing::info!(order_id = %id, status = %status, "Order status updated");
    Ok(ApiResponse::ok(order).with_message("Order status updated successfully!"))
}
