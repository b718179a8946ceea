//! Authentication route handlers.
//!
//! Registration, session login/logout, and the emailed password reset flow.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::extract::ApiJson;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::response::ApiResponse;
use crate::services::auth::AuthService;
use crate::state::AppState;

// =============================================================================
// Request / Response Types
// =============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub new_password: String,
}

/// Body of login and `check-auth`.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: &'static str,
    pub user: CurrentUser,
}

fn session_error(err: &tower_sessions::session::Error) -> AppError {
    AppError::Internal(format!("session error: {err}"))
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /api/auth/register`
#[instrument(skip(state, body))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let user = AuthService::new(state.pool(), &state.config().secret_key)
        .register(&body.user_name, &body.email, &body.password)
        .await?;

    tracing::info!(user_id = %user.id, "User registered");
    Ok((
        StatusCode::CREATED,
        ApiResponse::message("Registration successful"),
    ))
}

/// `POST /api/auth/login`
#[instrument(skip(state, session, body))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let user = AuthService::new(state.pool(), &state.config().secret_key)
        .login(&body.email, &body.password)
        .await?;

    let current = CurrentUser::from(&user);
    set_current_user(&session, &current)
        .await
        .map_err(|e| session_error(&e))?;
    set_sentry_user(&current.id, Some(current.email.as_str()));

    tracing::info!(user_id = %current.id, "User logged in");
    Ok(Json(AuthResponse {
        success: true,
        message: "Login successful",
        user: current,
    }))
}

/// `POST /api/auth/logout`
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<ApiResponse<()>> {
    clear_current_user(&session)
        .await
        .map_err(|e| session_error(&e))?;
    clear_sentry_user();

    Ok(ApiResponse::message("Logged out successfully!"))
}

/// `GET /api/auth/check-auth`
#[instrument(skip_all)]
pub async fn check_auth(OptionalAuth(user): OptionalAuth) -> Result<Json<AuthResponse>> {
    let user = user.ok_or_else(|| AppError::Unauthorized("Unauthorised user!".to_owned()))?;

    Ok(Json(AuthResponse {
        success: true,
        message: "User authenticated",
        user,
    }))
}

/// `POST /api/auth/forgot-password`
#[instrument(skip(state, body))]
pub async fn forgot_password(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ForgotPasswordRequest>,
) -> Result<ApiResponse<()>> {
    AuthService::new(state.pool(), &state.config().secret_key)
        .request_password_reset(&body.email, state.email(), &state.config().client_url)
        .await?;

    Ok(ApiResponse::message("Password reset email sent."))
}

/// `POST /api/auth/reset-password`
#[instrument(skip(state, body))]
pub async fn reset_password(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ResetPasswordRequest>,
) -> Result<ApiResponse<()>> {
    AuthService::new(state.pool(), &state.config().secret_key)
        .reset_password(&body.token, &body.new_password)
        .await?;

    Ok(ApiResponse::message("Password has been reset successfully."))
}
