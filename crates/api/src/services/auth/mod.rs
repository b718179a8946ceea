//! Authentication service.
//!
//! Provides password registration and login, plus the password reset flow.
//! Reset tokens are random, handed to the user once by email, and stored
//! only as an HMAC-SHA256 digest keyed by the server secret.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use sqlx::PgPool;

use bazaar_core::{Email, UserRole};

use crate::db::users::UserRepository;
use crate::db::{RepositoryError, password_resets, users};
use crate::models::user::User;
use crate::services::email::EmailService;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// How long a reset link stays valid.
pub const RESET_TOKEN_TTL_MINUTES: i64 = 60;

/// Random bytes per reset token.
const RESET_TOKEN_BYTES: usize = 32;

type HmacSha256 = Hmac<Sha256>;

/// Authentication service.
pub struct AuthService<'a> {
    pool: &'a PgPool,
    users: UserRepository<'a>,
    secret_key: &'a SecretString,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, secret_key: &'a SecretString) -> Self {
        Self {
            pool,
            users: UserRepository::new(pool),
            secret_key,
        }
    }

    // =========================================================================
    // Password Authentication
    // =========================================================================

    /// Register a new user with the `user` role.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingUserName` if the user name is blank.
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(
        &self,
        user_name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let user_name = user_name.trim();
        if user_name.is_empty() {
            return Err(AuthError::MissingUserName);
        }
        let email = Email::parse(email)?;
        validate_password(password)?;

        let password_hash = hash_password(password)?;

        self.users
            .create(user_name, &email, &password_hash, UserRole::User)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let credentials = self
            .users
            .get_credentials_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &credentials.password_hash)?;

        Ok(credentials.user)
    }

    // =========================================================================
    // Password Reset
    // =========================================================================

    /// Issue a reset token and email the reset link.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AccountNotFound` if no user has this email.
    /// Returns `AuthError::EmailDisabled` if SMTP is not configured.
    /// Returns `AuthError::EmailDelivery` if the email cannot be sent.
    pub async fn request_password_reset(
        &self,
        email: &str,
        mailer: Option<&EmailService>,
        client_url: &str,
    ) -> Result<(), AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::AccountNotFound)?;
        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        let mailer = mailer.ok_or(AuthError::EmailDisabled)?;

        let token = generate_reset_token();
        let expires_at = Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);
        password_resets::create(
            self.pool,
            user.id,
            &reset_token_digest(self.secret_key, &token)?,
            expires_at,
        )
        .await?;

        let reset_url = format!("{client_url}/reset-password/{token}");
        mailer
            .send_password_reset(
                user.email.as_str(),
                &user.user_name,
                &reset_url,
                RESET_TOKEN_TTL_MINUTES,
            )
            .await?;

        tracing::info!(user_id = %user.id, "Password reset email sent");
        Ok(())
    }

    /// Consume a reset token and set a new password.
    ///
    /// Marks the token used and invalidates the user's other outstanding
    /// tokens in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the new password is too short.
    /// Returns `AuthError::InvalidResetToken` if the token is unknown, expired or used.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError> {
        validate_password(new_password)?;
        let password_hash = hash_password(new_password)?;
        let digest = reset_token_digest(self.secret_key, token.trim())?;

        let mut tx = self.pool.begin().await?;

        let user_id = password_resets::consume(&mut *tx, &digest)
            .await?
            .ok_or(AuthError::InvalidResetToken)?;
        users::update_password(&mut *tx, user_id, &password_hash).await?;
        password_resets::invalidate_for_user(&mut *tx, user_id).await?;

        tx.commit().await?;

        tracing::info!(user_id = %user_id, "Password reset completed");
        Ok(())
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Generate a URL-safe random reset token.
fn generate_reset_token() -> String {
    let mut bytes = [0u8; RESET_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Hex HMAC-SHA256 of a reset token.
fn reset_token_digest(secret_key: &SecretString, token: &str) -> Result<String, AuthError> {
    let mut mac = HmacSha256::new_from_slice(secret_key.expose_secret().as_bytes())
        .map_err(|_| AuthError::PasswordHash)?;
    mac.update(token.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password_length() {
        assert!(matches!(
            validate_password("12345"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("123456").is_ok());
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong horse", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_verify_password_rejects_garbage_hash() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_reset_token_is_url_safe() {
        let token = generate_reset_token();
        assert_eq!(token.len(), 43);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
        assert_ne!(token, generate_reset_token());
    }

    #[test]
    fn test_reset_token_digest_depends_on_key() {
        let key_a = SecretString::from("kQ9#vL2$wX7!pR4@zM8^nT3&bY6*cF1%");
        let key_b = SecretString::from("zM8^nT3&bY6*cF1%kQ9#vL2$wX7!pR4@");

        let digest = reset_token_digest(&key_a, "token").unwrap();
        assert_eq!(digest, reset_token_digest(&key_a, "token").unwrap());
        assert_eq!(digest.len(), 64);
        assert_ne!(digest, reset_token_digest(&key_b, "token").unwrap());
        assert_ne!(digest, reset_token_digest(&key_a, "other").unwrap());
    }
}
