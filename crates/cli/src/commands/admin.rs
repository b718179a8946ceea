//! Admin account management.
//!
//! # Usage
//!
//! ```bash
//! # Create a new admin account
//! bazaar admin create -e admin@example.com -n "Store Admin" -p 'a long password'
//!
//! # Grant admin to an existing shopper
//! bazaar admin promote -e shopper@example.com
//! ```

use bazaar_api::db::RepositoryError;
use bazaar_api::db::users::UserRepository;
use bazaar_api::services::auth::hash_password;
use bazaar_core::{Email, UserId, UserRole};

use super::{CliError, connect};

const MIN_PASSWORD_LENGTH: usize = 6;

fn validate(email: &str, name: &str, password: &str) -> Result<Email, CliError> {
    let email = Email::parse(email).map_err(|e| CliError::Invalid(e.to_string()))?;
    if name.trim().is_empty() {
        return Err(CliError::Invalid("Name is required".to_owned()));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CliError::Invalid(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(email)
}

/// Create a new account with the admin role.
///
/// # Errors
///
/// Returns an error if input is invalid or the email is already registered.
pub async fn create_user(email: &str, name: &str, password: &str) -> Result<UserId, CliError> {
    let email = validate(email, name, password)?;
    let password_hash =
        hash_password(password).map_err(|e| CliError::Invalid(e.to_string()))?;

    let pool = connect().await?;
    let user = UserRepository::new(&pool)
        .create(name.trim(), &email, &password_hash, UserRole::Admin)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => {
                CliError::Invalid(format!("A user already exists with email: {email}"))
            }
            other => other.into(),
        })?;

    tracing::info!(user_id = %user.id, email = %user.email, "Admin user created");
    Ok(user.id)
}

/// Grant the admin role to an existing account.
///
/// # Errors
///
/// Returns an error if the email is invalid or no account uses it.
pub async fn promote(email: &str) -> Result<(), CliError> {
    let email = Email::parse(email).map_err(|e| CliError::Invalid(e.to_string()))?;

    let pool = connect().await?;
    let user = UserRepository::new(&pool)
        .set_role(&email, UserRole::Admin)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => {
                CliError::Invalid(format!("No account found with email: {email}"))
            }
            other => other.into(),
        })?;

    tracing::info!(user_id = %user.id, email = %user.email, "User promoted to admin");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_good_input() {
        let email = validate("Admin@Example.com", "Store Admin", "s3cret-pass");
        assert!(matches!(email, Ok(e) if e.as_str() == "admin@example.com"));
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        assert!(validate("not-an-email", "Admin", "s3cret-pass").is_err());
        assert!(validate("admin@example.com", "  ", "s3cret-pass").is_err());
        assert!(validate("admin@example.com", "Admin", "short").is_err());
    }
}
