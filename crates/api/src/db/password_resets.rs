//! Password reset token storage.
//!
//! Only the HMAC digest of a token is stored. Consuming a token is a single
//! conditional `UPDATE`, so two concurrent resets with the same token cannot
//! both succeed.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use bazaar_core::UserId;

use super::RepositoryError;

/// Store a new reset token digest for a user.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn create(
    pool: &PgPool,
    user_id: UserId,
    token_hash: &str,
    expires_at: DateTime<Utc>,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO shop.password_reset_token (user_id, token_hash, expires_at)
        VALUES ($1, $2, $3)
        ",
    )
    .bind(user_id)
    .bind(token_hash)
    .bind(expires_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Mark an unused, unexpired token as used and return its owner.
///
/// Returns `None` when the digest is unknown, expired or already used.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the update fails.
pub async fn consume(
    conn: &mut PgConnection,
    token_hash: &str,
) -> Result<Option<UserId>, RepositoryError> {
    let user_id = sqlx::query_scalar::<_, UserId>(
        r"
        UPDATE shop.password_reset_token
        SET used_at = NOW()
        WHERE token_hash = $1
          AND used_at IS NULL
          AND expires_at > NOW()
        RETURNING user_id
        ",
    )
    .bind(token_hash)
    .fetch_optional(conn)
    .await?;

    Ok(user_id)
}

/// Invalidate every outstanding token belonging to a user.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the update fails.
pub async fn invalidate_for_user(
    conn: &mut PgConnection,
    user_id: UserId,
) -> Result<u64, RepositoryError> {
    let result = sqlx::query(
        r"
        UPDATE shop.password_reset_token
        SET used_at = NOW()
        WHERE user_id = $1 AND used_at IS NULL
        ",
    )
    .bind(user_id)
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}
