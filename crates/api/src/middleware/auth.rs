//! Authentication extractors.
//!
//! The session stores a [`CurrentUser`] under [`session_keys::CURRENT_USER`]
//! after login. These extractors read it back for route handlers.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::{CurrentUser, session_keys};

/// Extractor that requires a logged-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.user_name)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_user(parts)
            .await
            .map(Self)
            .ok_or_else(unauthenticated)
    }
}

/// Extractor that requires a logged-in admin.
///
/// Responds 401 without a session user and 403 for non-admins.
pub struct RequireAdmin(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = current_user(parts).await.ok_or_else(unauthenticated)?;
        if !user.is_admin() {
            tracing::warn!(user_id = %user.id, path = %parts.uri.path(), "Admin route denied");
            return Err(AppError::Forbidden("Admin privileges required".to_owned()));
        }
        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if nobody is logged in.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(current_user(parts).await))
    }
}

async fn current_user(parts: &Parts) -> Option<CurrentUser> {
    let session = parts.extensions.get::<Session>()?;
    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

fn unauthenticated() -> AppError {
    AppError::Unauthorized("Authentication required".to_owned())
}

/// Store the logged-in user in the session.
///
/// Cycles the session id first so a pre-login id cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Drop the whole session (logout).
///
/// # Errors
///
/// Returns an error if the session store cannot delete the record.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};

    #[tokio::test]
    async fn test_require_auth_without_session_is_unauthorized() {
        let (mut parts, ()) = Request::builder().uri("/api/users").body(()).unwrap().into_parts();
        let result = RequireAuth::from_request_parts(&mut parts, &()).await;
        let err = result.err().unwrap();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.client_message(), "Authentication required");
    }

    #[tokio::test]
    async fn test_require_admin_without_session_is_unauthorized() {
        let (mut parts, ()) = Request::builder().uri("/api/admin/orders").body(()).unwrap().into_parts();
        let result = RequireAdmin::from_request_parts(&mut parts, &()).await;
        assert_eq!(result.err().unwrap().status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_optional_auth_without_session_is_none() {
        let (mut parts, ()) = Request::builder().uri("/").body(()).unwrap().into_parts();
        let OptionalAuth(user) = OptionalAuth::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(user.is_none());
    }
}
