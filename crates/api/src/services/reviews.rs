//! Review workflow: purchase check and rating average upkeep.
//!
//! Every write locks the product row first, so concurrent reviews of one
//! product recompute its average one after another.

use sqlx::{PgConnection, PgPool};
use tracing::instrument;

use bazaar_core::{ProductId, ReviewId, average_rating};

use crate::db::RepositoryError;
use crate::db::orders::OrderRepository;
use crate::db::products::{self, ProductRepository};
use crate::db::reviews::{self, ReviewRepository};
use crate::error::AppError;
use crate::models::CurrentUser;
use crate::models::review::{NewReview, Review, ReviewUpdate};

const PRODUCT_NOT_FOUND: &str = "Product not found!";
const REVIEW_NOT_FOUND: &str = "Review not found.";
const CANNOT_UPDATE: &str = "Review not found or you do not have permission to update it.";

async fn lock_product(conn: &mut PgConnection, product_id: ProductId) -> Result<(), AppError> {
    if products::lock(conn, product_id).await? {
        Ok(())
    } else {
        Err(AppError::NotFound(PRODUCT_NOT_FOUND.to_owned()))
    }
}

/// Recompute and store a product's average rating.
async fn refresh_average(conn: &mut PgConnection, product_id: ProductId) -> Result<(), AppError> {
    let values = reviews::ratings_for_product(&mut *conn, product_id).await?;
    let average = average_rating(&values);
    products::set_average_review(conn, product_id, average).await?;
    tracing::debug!(product_id = %product_id, average, "Review average updated");
    Ok(())
}

/// Review service.
pub struct ReviewService<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Post a review for a product the caller has paid for.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for invalid input or a second review.
    /// Returns `AppError::Forbidden` when posting for another user or without a purchase.
    /// Returns `AppError::NotFound` for an unknown product.
    #[instrument(skip(self, caller, review), fields(product_id = %review.product_id))]
    pub async fn create(&self, caller: &CurrentUser, review: &NewReview) -> Result<Review, AppError> {
        let rating = review.validate()?;
        caller.ensure_can_access(review.user_id)?;

        if ProductRepository::new(self.pool)
            .get(review.product_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound(PRODUCT_NOT_FOUND.to_owned()));
        }

        let purchased = OrderRepository::new(self.pool)
            .has_completed_purchase(review.user_id, review.product_id)
            .await?;
        if !purchased {
            return Err(AppError::Forbidden(
                "You need to purchase product to review it.".to_owned(),
            ));
        }

        let mut tx = self.pool.begin().await?;
        lock_product(&mut *tx, review.product_id).await?;
        let created = reviews::insert(
            &mut *tx,
            review.product_id,
            review.user_id,
            &review.user_name,
            &review.review_message,
            rating,
        )
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(message) => AppError::BadRequest(message),
            other => AppError::Database(other),
        })?;
        refresh_average(&mut *tx, review.product_id).await?;
        tx.commit().await?;

        Ok(created)
    }

    /// Edit the caller's own review.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for invalid input or when the review
    /// is missing or written by someone else.
    #[instrument(skip(self, caller, update))]
    pub async fn update(
        &self,
        caller: &CurrentUser,
        id: ReviewId,
        update: &ReviewUpdate,
    ) -> Result<Review, AppError> {
        let rating = update.validate()?;

        let existing = ReviewRepository::new(self.pool)
            .get(id)
            .await?
            .filter(|review| review.user_id == caller.id)
            .ok_or_else(|| AppError::BadRequest(CANNOT_UPDATE.to_owned()))?;

        let mut tx = self.pool.begin().await?;
        lock_product(&mut *tx, existing.product_id).await?;
        let updated =
            reviews::update_by_author(&mut *tx, id, caller.id, &update.review_message, rating)
                .await?
                .ok_or_else(|| AppError::BadRequest(CANNOT_UPDATE.to_owned()))?;
        refresh_average(&mut *tx, updated.product_id).await?;
        tx.commit().await?;

        Ok(updated)
    }

    /// Delete a review. Authors may delete their own; admins may delete any.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if the review does not exist.
    /// Returns `AppError::Forbidden` if the caller is neither author nor admin.
    #[instrument(skip(self, caller))]
    pub async fn delete(&self, caller: &CurrentUser, id: ReviewId) -> Result<Review, AppError> {
        let existing = ReviewRepository::new(self.pool)
            .get(id)
            .await?
            .ok_or_else(|| AppError::BadRequest(REVIEW_NOT_FOUND.to_owned()))?;
        caller.ensure_can_access(existing.user_id)?;

        let mut tx = self.pool.begin().await?;
        lock_product(&mut *tx, existing.product_id).await?;
        let deleted = reviews::delete(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::BadRequest(REVIEW_NOT_FOUND.to_owned()))?;
        refresh_average(&mut *tx, deleted.product_id).await?;
        tx.commit().await?;

        Ok(deleted)
    }
}
