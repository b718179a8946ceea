//! Homepage feature banners.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_core::FeatureId;

use crate::error::AppError;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    pub id: FeatureId,
    pub image: String,
    pub alt_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request body for adding a banner.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFeature {
    #[serde(default)]
    pub image: String,
    pub alt_text: Option<String>,
}

impl NewFeature {
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` when the image URL is blank.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.image.trim().is_empty() {
            return Err(AppError::BadRequest("Image URL is required".to_owned()));
        }
        Ok(())
    }
}
