//! Admin user listing.

use axum::extract::State;
use tracing::instrument;

use crate::db::users::UserRepository;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::user::User;
use crate::response::ApiResponse;
use crate::state::AppState;

/// `GET /api/users` - every account, newest first.
#[instrument(skip(state, _admin))]
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<ApiResponse<Vec<User>>> {
    let users = UserRepository::new(state.pool()).list_all().await?;
    Ok(ApiResponse::ok(users))
}
