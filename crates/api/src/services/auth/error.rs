//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::email::EmailError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] bazaar_core::EmailError),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Registration without a user name.
    #[error("user name is required")]
    MissingUserName,

    /// No account for the email a reset was requested for.
    #[error("no account for this email")]
    AccountNotFound,

    /// Reset token unknown, expired or already used.
    #[error("invalid or expired reset token")]
    InvalidResetToken,

    /// SMTP is not configured.
    #[error("email delivery is not configured")]
    EmailDisabled,

    /// Sending the reset email failed.
    #[error("email delivery failed: {0}")]
    EmailDelivery(#[from] EmailError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(err))
    }
}
