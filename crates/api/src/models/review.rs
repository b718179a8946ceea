//! Product reviews.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_core::{ProductId, Rating, ReviewId, UserId};

use crate::error::AppError;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: UserId,
    pub user_name: String,
    pub review_message: String,
    pub review_value: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for posting a review.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub product_id: ProductId,
    pub user_id: UserId,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub review_message: String,
    pub review_value: i64,
}

impl NewReview {
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for blank text or an out-of-range rating.
    pub fn validate(&self) -> Result<Rating, AppError> {
        if self.user_name.trim().is_empty() || self.review_message.trim().is_empty() {
            return Err(AppError::BadRequest("Invalid data provided!".to_owned()));
        }
        parse_rating(self.review_value)
    }
}

/// Request body for editing a review.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewUpdate {
    #[serde(default)]
    pub review_message: String,
    pub review_value: i64,
}

impl ReviewUpdate {
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for a blank message or an out-of-range rating.
    pub fn validate(&self) -> Result<Rating, AppError> {
        if self.review_message.trim().is_empty() {
            return Err(AppError::BadRequest("Invalid data provided!".to_owned()));
        }
        parse_rating(self.review_value)
    }
}

fn parse_rating(value: i64) -> Result<Rating, AppError> {
    Rating::new(value)
        .map_err(|_| AppError::BadRequest("Review value must be between 1 and 5".to_owned()))
}
