//! Review repository.
//!
//! Writes run on a borrowed connection so the service can recompute the
//! product's average rating in the same transaction.

use sqlx::{PgConnection, PgPool};

use bazaar_core::{ProductId, Rating, ReviewId, UserId};

use super::{RepositoryError, conflict_on_unique};
use crate::models::review::Review;

const REVIEW_COLUMNS: &str =
    "id, product_id, user_id, user_name, review_message, review_value, created_at, updated_at";

/// Repository for review reads.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a product's reviews, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Review>, RepositoryError> {
        let rows = sqlx::query_as::<_, Review>(&format!(
            r"
            SELECT {REVIEW_COLUMNS} FROM shop.review
            WHERE product_id = $1
            ORDER BY created_at DESC, id DESC
            "
        ))
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Get a review by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ReviewId) -> Result<Option<Review>, RepositoryError> {
        let row = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM shop.review WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }
}

/// Insert a review.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if the user already reviewed the product.
/// Returns `RepositoryError::Database` for other database errors.
pub async fn insert(
    conn: &mut PgConnection,
    product_id: ProductId,
    user_id: UserId,
    user_name: &str,
    message: &str,
    rating: Rating,
) -> Result<Review, RepositoryError> {
    sqlx::query_as::<_, Review>(&format!(
        r"
        INSERT INTO shop.review (product_id, user_id, user_name, review_message, review_value)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {REVIEW_COLUMNS}
        "
    ))
    .bind(product_id)
    .bind(user_id)
    .bind(user_name.trim())
    .bind(message.trim())
    .bind(rating.get())
    .fetch_one(conn)
    .await
    .map_err(|e| conflict_on_unique(e, "You already reviewed this product!"))
}

/// Update a review only if `author` wrote it.
///
/// Returns `None` when the review does not exist or belongs to someone else.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the update fails.
pub async fn update_by_author(
    conn: &mut PgConnection,
    id: ReviewId,
    author: UserId,
    message: &str,
    rating: Rating,
) -> Result<Option<Review>, RepositoryError> {
    let row = sqlx::query_as::<_, Review>(&format!(
        r"
        UPDATE shop.review
        SET review_message = $3, review_value = $4
        WHERE id = $1 AND user_id = $2
        RETURNING {REVIEW_COLUMNS}
        "
    ))
    .bind(id)
    .bind(author)
    .bind(message.trim())
    .bind(rating.get())
    .fetch_optional(conn)
    .await?;

    Ok(row)
}

/// Delete a review and return it.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the delete fails.
pub async fn delete(
    conn: &mut PgConnection,
    id: ReviewId,
) -> Result<Option<Review>, RepositoryError> {
    let row = sqlx::query_as::<_, Review>(&format!(
        "DELETE FROM shop.review WHERE id = $1 RETURNING {REVIEW_COLUMNS}"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(row)
}

/// All rating values for a product.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn ratings_for_product(
    conn: &mut PgConnection,
    product_id: ProductId,
) -> Result<Vec<i16>, RepositoryError> {
    let values =
        sqlx::query_scalar::<_, i16>("SELECT review_value FROM shop.review WHERE product_id = $1")
            .bind(product_id)
            .fetch_all(conn)
            .await?;

    Ok(values)
}
