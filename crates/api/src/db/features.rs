//! Feature banner repository.

use sqlx::PgPool;

use bazaar_core::FeatureId;

use super::RepositoryError;
use crate::models::feature::{Feature, NewFeature};

/// Repository for homepage banner images.
pub struct FeatureRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FeatureRepository<'a> {
    /// Create a new feature repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every banner, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Feature>, RepositoryError> {
        let rows = sqlx::query_as::<_, Feature>(
            "SELECT id, image, alt_text, created_at FROM shop.feature ORDER BY created_at, id",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Add a banner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, feature: &NewFeature) -> Result<Feature, RepositoryError> {
        let row = sqlx::query_as::<_, Feature>(
            r"
            INSERT INTO shop.feature (image, alt_text)
            VALUES ($1, $2)
            RETURNING id, image, alt_text, created_at
            ",
        )
        .bind(feature.image.trim())
        .bind(&feature.alt_text)
        .fetch_one(self.pool)
        .await?;

        Ok(row)
    }

    /// Delete a banner and return it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the banner does not exist.
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: FeatureId) -> Result<Feature, RepositoryError> {
        sqlx::query_as::<_, Feature>(
            "DELETE FROM shop.feature WHERE id = $1 RETURNING id, image, alt_text, created_at",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}
