//! Shopping cart types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bazaar_core::{CartId, ProductId, UserId};

use crate::error::AppError;

/// Most units of one product a cart line may hold.
pub const MAX_LINE_QUANTITY: i32 = 10_000;

const INVALID_DATA: &str = "Invalid data provided!";

/// A cart line joined with the product it refers to.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CartItemView {
    pub product_id: ProductId,
    pub image: Option<String>,
    pub title: String,
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    pub quantity: i32,
}

/// A user's cart. `cart_id` is `None` until the first item is added.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub cart_id: Option<CartId>,
    pub user_id: UserId,
    pub items: Vec<CartItemView>,
}

impl CartView {
    #[must_use]
    pub const fn empty(user_id: UserId) -> Self {
        Self {
            cart_id: None,
            user_id,
            items: Vec::new(),
        }
    }
}

/// Request body shared by add-to-cart and update-quantity.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineRequest {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i32,
}

impl CartLineRequest {
    /// Check the quantity lies in `min..=MAX_LINE_QUANTITY`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` otherwise.
    pub fn validate_quantity(&self, min: i32) -> Result<(), AppError> {
        if (min..=MAX_LINE_QUANTITY).contains(&self.quantity) {
            Ok(())
        } else {
            Err(AppError::BadRequest(INVALID_DATA.to_owned()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(quantity: i32) -> CartLineRequest {
        CartLineRequest {
            user_id: UserId::new(1),
            product_id: ProductId::new(2),
            quantity,
        }
    }

    #[test]
    fn test_validate_quantity_bounds() {
        assert!(line(1).validate_quantity(1).is_ok());
        assert!(line(0).validate_quantity(0).is_ok());
        assert!(line(MAX_LINE_QUANTITY).validate_quantity(1).is_ok());

        assert!(line(0).validate_quantity(1).is_err());
        assert!(line(-1).validate_quantity(0).is_err());
        assert!(line(MAX_LINE_QUANTITY + 1).validate_quantity(1).is_err());
        assert!(line(i32::MAX).validate_quantity(0).is_err());
    }
}
