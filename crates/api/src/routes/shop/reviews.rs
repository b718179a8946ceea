//! Product review route handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use tracing::instrument;

use bazaar_core::{ProductId, ReviewId};

use crate::db::reviews::ReviewRepository;
use crate::error::Result;
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::RequireAuth;
use crate::models::review::{NewReview, Review, ReviewUpdate};
use crate::response::ApiResponse;
use crate::services::reviews::ReviewService;
use crate::state::AppState;

/// `POST /api/shop/review`
#[instrument(skip(state, user, body))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(body): ApiJson<NewReview>,
) -> Result<impl IntoResponse> {
    let review = ReviewService::new(state.pool()).create(&user, &body).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(review)))
}

/// `GET /api/shop/review/{productId}` - public, newest first.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    ApiPath(product_id): ApiPath<ProductId>,
) -> Result<ApiResponse<Vec<Review>>> {
    let reviews = ReviewRepository::new(state.pool())
        .list_for_product(product_id)
        .await?;
    Ok(ApiResponse::ok(reviews))
}

/// `PUT /api/shop/review/{reviewId}`
#[instrument(skip(state, user, body))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<ReviewId>,
    ApiJson(body): ApiJson<ReviewUpdate>,
) -> Result<ApiResponse<Review>> {
    let review = ReviewService::new(state.pool())
        .update(&user, id, &body)
        .await?;
    Ok(ApiResponse::ok(review).with_message("Review updated successfully"))
}

/// `DELETE /api/shop/review/{reviewId}`
#[instrument(skip(state, user))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<ReviewId>,
) -> Result<ApiResponse<Review>> {
    let review = ReviewService::new(state.pool()).delete(&user, id).await?;
    Ok(ApiResponse::ok(review).with_message("Review deleted successfully"))
}
