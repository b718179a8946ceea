//! Admin catalogue management.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use tracing::instrument;

use bazaar_core::ProductId;

use crate::db::products::ProductRepository;
use crate::error::{Result, not_found_as};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::RequireAdmin;
use crate::models::product::{NewProduct, Product, ProductUpdate};
use crate::response::ApiResponse;
use crate::state::AppState;

const PRODUCT_NOT_FOUND: &str = "Product not found";

/// `GET /api/admin/products` - newest first.
#[instrument(skip(state, _admin))]
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<ApiResponse<Vec<Product>>> {
    let products = ProductRepository::new(state.pool()).list_all().await?;
    Ok(ApiResponse::ok(products))
}

/// `POST /api/admin/products/add`
#[instrument(skip(state, admin, body), fields(admin_id = %admin.id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(body): ApiJson<NewProduct>,
) -> Result<impl IntoResponse> {
    body.validate()?;

    let product = ProductRepository::new(state.pool()).create(&body).await?;
    tracing::info!(product_id = %product.id, "Product created");
    Ok((StatusCode::CREATED, ApiResponse::ok(product)))
}

/// `PUT /api/admin/products/edit/{id}`
#[instrument(skip(state, admin, body), fields(admin_id = %admin.id))]
pub async fn edit(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(body): ApiJson<ProductUpdate>,
) -> Result<ApiResponse<Product>> {
    body.validate()?;

    let product = ProductRepository::new(state.pool())
        .update(id, &body)
        .await
        .map_err(not_found_as(PRODUCT_NOT_FOUND))?;
    Ok(ApiResponse::ok(product))
}

/// `DELETE /api/admin/products/delete/{id}`
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<ApiResponse<()>> {
    ProductRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(not_found_as(PRODUCT_NOT_FOUND))?;

    tracing::info!(product_id = %id, "Product deleted");
    Ok(ApiResponse::message("Product deleted successfully"))
}
