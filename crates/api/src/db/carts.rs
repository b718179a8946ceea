//! Cart repository.
//!
//! A cart row is created lazily on the first add and reused afterwards.
//! Lines are keyed by `(cart_id, product_id)`, so adding a product that is
//! already in the cart increments its quantity.

use sqlx::{PgConnection, PgPool};

use bazaar_core::{CartId, ProductId, UserId};

use super::RepositoryError;
use crate::models::cart::{CartItemView, CartView, MAX_LINE_QUANTITY};

const ITEM_VIEW_SELECT: &str = r"
    SELECT ci.product_id, p.image, p.title, p.price, p.sale_price, ci.quantity
    FROM shop.cart_item ci
    JOIN shop.product p ON p.id = ci.product_id
";

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the ID of a user's cart, if they have one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn cart_id_for_user(&self, user_id: UserId) -> Result<Option<CartId>, RepositoryError> {
        let id = sqlx::query_scalar::<_, CartId>("SELECT id FROM shop.cart WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?;

        Ok(id)
    }

    /// Get a user's cart, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn get_or_create(&self, user_id: UserId) -> Result<CartId, RepositoryError> {
        let id = sqlx::query_scalar::<_, CartId>(
            r"
            INSERT INTO shop.cart (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO UPDATE SET updated_at = NOW()
            RETURNING id
            ",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(id)
    }

    /// Add `quantity` of a product, summing with any existing line.
    ///
    /// Returns `None` and leaves the line unchanged when the sum would
    /// exceed [`MAX_LINE_QUANTITY`]. `quantity` must already be within it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn add_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<Option<CartItemView>, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO shop.cart_item (cart_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (cart_id, product_id)
            DO UPDATE SET quantity = shop.cart_item.quantity + EXCLUDED.quantity
            WHERE shop.cart_item.quantity <= $4 - EXCLUDED.quantity
            ",
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity)
        .bind(MAX_LINE_QUANTITY)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.item(cart_id, product_id)
            .await?
            .ok_or(RepositoryError::NotFound)
            .map(Some)
    }

    /// Get one line of a cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
    ) -> Result<Option<CartItemView>, RepositoryError> {
        let row = sqlx::query_as::<_, CartItemView>(&format!(
            "{ITEM_VIEW_SELECT} WHERE ci.cart_id = $1 AND ci.product_id = $2"
        ))
        .bind(cart_id)
        .bind(product_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// All lines of a cart in the order they were added.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, cart_id: CartId) -> Result<Vec<CartItemView>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartItemView>(&format!(
            "{ITEM_VIEW_SELECT} WHERE ci.cart_id = $1 ORDER BY ci.added_at, ci.product_id"
        ))
        .bind(cart_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Load a user's cart. Users without a cart get an empty view.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn view_for_user(&self, user_id: UserId) -> Result<CartView, RepositoryError> {
        let Some(cart_id) = self.cart_id_for_user(user_id).await? else {
            return Ok(CartView::empty(user_id));
        };

        Ok(CartView {
            cart_id: Some(cart_id),
            user_id,
            items: self.items(cart_id).await?,
        })
    }

    /// Set the quantity of an existing line. A quantity of zero removes it.
    ///
    /// Returns `false` if the product is not in the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_quantity(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<bool, RepositoryError> {
        let result = if quantity == 0 {
            sqlx::query("DELETE FROM shop.cart_item WHERE cart_id = $1 AND product_id = $2")
                .bind(cart_id)
                .bind(product_id)
                .execute(self.pool)
                .await?
        } else {
            sqlx::query(
                "UPDATE shop.cart_item SET quantity = $3 WHERE cart_id = $1 AND product_id = $2",
            )
            .bind(cart_id)
            .bind(product_id)
            .bind(quantity)
            .execute(self.pool)
            .await?
        };

        Ok(result.rows_affected() > 0)
    }

    /// Remove a line. Removing an absent product is not an error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn remove_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM shop.cart_item WHERE cart_id = $1 AND product_id = $2")
            .bind(cart_id)
            .bind(product_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}

/// Empty a user's cart. Used after a payment is captured.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the delete fails.
pub async fn clear_for_user(
    conn: &mut PgConnection,
    user_id: UserId,
) -> Result<u64, RepositoryError> {
    let result = sqlx::query(
        r"
        DELETE FROM shop.cart_item
        WHERE cart_id IN (SELECT id FROM shop.cart WHERE user_id = $1)
        ",
    )
    .bind(user_id)
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}
