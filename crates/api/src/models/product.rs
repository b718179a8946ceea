//! Product catalogue types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bazaar_core::{ProductId, effective_price};

use crate::error::AppError;

/// A catalogue product.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub brand: String,
    pub image: Option<String>,
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    pub total_stock: i32,
    pub average_review: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Unit price charged at checkout.
    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        effective_price(self.price, self.sale_price)
    }
}

/// Request body for creating a product.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub image: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub brand: String,
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    #[serde(default)]
    pub total_stock: i32,
    #[serde(default)]
    pub average_review: f64,
}

impl NewProduct {
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` describing the first invalid field.
    pub fn validate(&self) -> Result<(), AppError> {
        validate_title(&self.title)?;
        validate_money("price", self.price)?;
        if let Some(sale) = self.sale_price {
            validate_money("salePrice", sale)?;
        }
        validate_stock(self.total_stock)?;
        validate_average(self.average_review)?;
        Ok(())
    }
}

/// Request body for editing a product. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub image: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub price: Option<Decimal>,
    pub sale_price: Option<Decimal>,
    pub total_stock: Option<i32>,
    pub average_review: Option<f64>,
}

impl ProductUpdate {
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` describing the first invalid field.
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(price) = self.price {
            validate_money("price", price)?;
        }
        if let Some(sale) = self.sale_price {
            validate_money("salePrice", sale)?;
        }
        if let Some(stock) = self.total_stock {
            validate_stock(stock)?;
        }
        if let Some(average) = self.average_review {
            validate_average(average)?;
        }
        Ok(())
    }
}

fn validate_title(title: &str) -> Result<(), AppError> {
    if title.trim().is_empty() {
        return Err(AppError::BadRequest("Product title is required".to_owned()));
    }
    Ok(())
}

/// Largest amount a `NUMERIC(12, 2)` column holds.
const MAX_MONEY: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

fn validate_money(field: &str, value: Decimal) -> Result<(), AppError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(AppError::BadRequest(format!("{field} cannot be negative")));
    }
    if value > MAX_MONEY {
        return Err(AppError::BadRequest(format!("{field} is too large")));
    }
    if value.scale() > 2 && value.round_dp(2) != value {
        return Err(AppError::BadRequest(format!(
            "{field} cannot have more than two decimals"
        )));
    }
    Ok(())
}

fn validate_stock(stock: i32) -> Result<(), AppError> {
    if stock < 0 {
        return Err(AppError::BadRequest(
            "totalStock cannot be negative".to_owned(),
        ));
    }
    Ok(())
}

fn validate_average(average: f64) -> Result<(), AppError> {
    if !(0.0..=5.0).contains(&average) {
        return Err(AppError::BadRequest(
            "averageReview must be between 0 and 5".to_owned(),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn new_product(json: serde_json::Value) -> NewProduct {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_new_product_accepts_numbers_and_strings() {
        let product = new_product(serde_json::json!({
            "title": "Linen Shirt",
            "price": 49.99,
            "salePrice": "39.50",
            "totalStock": 12
        }));
        assert!(product.validate().is_ok());
        assert_eq!(product.price, Decimal::new(4999, 2));
        assert_eq!(product.sale_price, Some(Decimal::new(3950, 2)));
    }

    #[test]
    fn test_new_product_requires_title() {
        let product = new_product(serde_json::json!({ "title": "  ", "price": 10 }));
        assert!(matches!(product.validate(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_new_product_rejects_negative_values() {
        let product = new_product(serde_json::json!({ "title": "Cap", "price": -1 }));
        assert!(product.validate().is_err());

        let product = new_product(serde_json::json!({
            "title": "Cap", "price": 5, "totalStock": -3
        }));
        assert!(product.validate().is_err());
    }

    #[test]
    fn test_new_product_rejects_fractional_cents() {
        let product = new_product(serde_json::json!({ "title": "Cap", "price": "1.005" }));
        assert!(product.validate().is_err());
    }

    #[test]
    fn test_money_limit_matches_column_precision() {
        assert_eq!(MAX_MONEY, Decimal::new(999_999_999_999, 2));

        let product = new_product(serde_json::json!({
            "title": "Yacht", "price": "9999999999.99"
        }));
        assert!(product.validate().is_ok());

        let product = new_product(serde_json::json!({
            "title": "Yacht", "price": "10000000000.00"
        }));
        assert!(matches!(product.validate(), Err(AppError::BadRequest(_))));

        let update = ProductUpdate {
            sale_price: Some(Decimal::new(1_000_000_000_000, 2)),
            ..ProductUpdate::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_update_validates_only_present_fields() {
        assert!(ProductUpdate::default().validate().is_ok());

        let update = ProductUpdate {
            title: Some(String::new()),
            ..ProductUpdate::default()
        };
        assert!(update.validate().is_err());

        let update = ProductUpdate {
            average_review: Some(5.5),
            ..ProductUpdate::default()
        };
        assert!(update.validate().is_err());
    }
}
