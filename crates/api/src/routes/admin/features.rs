//! Homepage banner management.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use tracing::instrument;

use bazaar_core::FeatureId;

use crate::error::{Result, not_found_as};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::RequireAdmin;
use crate::models::feature::{Feature, NewFeature};
use crate::response::ApiResponse;
use crate::state::AppState;

/// `POST /api/admin/feature/add`
#[instrument(skip(state, admin, body), fields(admin_id = %admin.id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(body): ApiJson<NewFeature>,
) -> Result<impl IntoResponse> {
    body.validate()?;
    let feature = state.features().add(state.pool(), &body).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(feature)))
}

/// `GET /api/admin/feature/all` - public.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<ApiResponse<Vec<Feature>>> {
    let features = state.features().list(state.pool()).await?;
    Ok(ApiResponse::ok(Vec::clone(&features)))
}

/// `DELETE /api/admin/feature/{id}`
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<FeatureId>,
) -> Result<ApiResponse<Feature>> {
    let feature = state
        .features()
        .delete(state.pool(), id)
        .await
        .map_err(not_found_as("Image not found"))?;
    Ok(ApiResponse::ok(feature).with_message("Feature image deleted successfully"))
}
