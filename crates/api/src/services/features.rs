//! Cached homepage banner list.
//!
//! The banner list is read on every storefront page load and changes rarely,
//! so it is cached for 5 minutes and invalidated on every add or delete.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use bazaar_core::FeatureId;

use crate::db::RepositoryError;
use crate::db::features::FeatureRepository;
use crate::models::feature::{Feature, NewFeature};

const CACHE_KEY: &str = "features";
const CACHE_TTL: Duration = Duration::from_secs(300);

/// Banner list backed by the database with an in-memory cache.
#[derive(Clone)]
pub struct FeatureCache {
    cache: Cache<&'static str, Arc<Vec<Feature>>>,
}

impl Default for FeatureCache {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(1)
                .time_to_live(CACHE_TTL)
                .build(),
        }
    }

    /// All banners, served from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if loading from the database fails.
    pub async fn list(&self, pool: &PgPool) -> Result<Arc<Vec<Feature>>, RepositoryError> {
        if let Some(features) = self.cache.get(CACHE_KEY).await {
            return Ok(features);
        }

        let features = Arc::new(FeatureRepository::new(pool).list_all().await?);
        self.cache.insert(CACHE_KEY, Arc::clone(&features)).await;
        Ok(features)
    }

    /// Add a banner and drop the cached list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn add(&self, pool: &PgPool, feature: &NewFeature) -> Result<Feature, RepositoryError> {
        let created = FeatureRepository::new(pool).create(feature).await?;
        self.cache.invalidate(CACHE_KEY).await;
        Ok(created)
    }

    /// Delete a banner and drop the cached list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the banner does not exist.
    pub async fn delete(&self, pool: &PgPool, id: FeatureId) -> Result<Feature, RepositoryError> {
        let deleted = FeatureRepository::new(pool).delete(id).await?;
        self.cache.invalidate(CACHE_KEY).await;
        Ok(deleted)
    }
}
