//! Order types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bazaar_core::{
    AddressId, CartId, OrderId, OrderStatus, PaymentMethod, PaymentStatus, ProductId, UserId,
};

use crate::error::AppError;

/// A purchased line, snapshotted from the catalogue when the order was placed.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub title: String,
    pub image: Option<String>,
    pub price: Decimal,
    pub quantity: i32,
}

/// Delivery address, snapshotted from the user's saved address.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInfo {
    pub address_id: Option<AddressId>,
    pub address: String,
    pub city: String,
    pub pincode: String,
    pub phone: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub cart_id: Option<CartId>,
    pub cart_items: Vec<OrderItem>,
    pub address_info: AddressInfo,
    pub order_status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub total_amount: Decimal,
    pub payment_id: Option<String>,
    pub payer_id: Option<String>,
    pub order_date: DateTime<Utc>,
    pub order_update_date: DateTime<Utc>,
}

/// A line requested at checkout. Only the product and quantity are trusted;
/// titles and prices sent by the client are ignored.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    pub product_id: ProductId,
    pub quantity: i32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRef {
    pub address_id: AddressId,
}

/// Request body for placing an order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub user_id: UserId,
    pub cart_id: Option<CartId>,
    #[serde(default)]
    pub cart_items: Vec<OrderLineRequest>,
    pub address_info: AddressRef,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

impl CreateOrderRequest {
    /// Validate lines and merge duplicates of the same product.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for an empty cart or a non-positive quantity.
    pub fn merged_lines(&self) -> Result<Vec<OrderLineRequest>, AppError> {
        if self.cart_items.is_empty() {
            return Err(AppError::BadRequest("Cart is empty".to_owned()));
        }

        let mut merged: Vec<OrderLineRequest> = Vec::with_capacity(self.cart_items.len());
        for line in &self.cart_items {
            if line.quantity < 1 {
                return Err(AppError::BadRequest(
                    "Quantity must be at least 1".to_owned(),
                ));
            }
            match merged.iter_mut().find(|m| m.product_id == line.product_id) {
                Some(existing) => {
                    existing.quantity = existing.quantity.checked_add(line.quantity).ok_or_else(
                        || AppError::BadRequest("Quantity is too large".to_owned()),
                    )?;
                }
                None => merged.push(*line),
            }
        }
        Ok(merged)
    }
}

/// Request body sent after the shopper approves the PayPal payment.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureRequest {
    #[serde(default)]
    pub payment_id: String,
    #[serde(default)]
    pub payer_id: String,
    pub order_id: OrderId,
}

impl CaptureRequest {
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` when the PayPal identifiers are blank.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.payment_id.trim().is_empty() || self.payer_id.trim().is_empty() {
            return Err(AppError::BadRequest(
                "paymentId and payerId are required".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Request body for the admin status update.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusUpdate {
    #[serde(default)]
    pub order_status: String,
}

impl OrderStatusUpdate {
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for an unknown status name.
    pub fn parse(&self) -> Result<OrderStatus, AppError> {
        self.order_status
            .parse()
            .map_err(|_| AppError::BadRequest("Invalid order status".to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(items: serde_json::Value) -> CreateOrderRequest {
        serde_json::from_value(serde_json::json!({
            "userId": 1,
            "cartId": 4,
            "cartItems": items,
            "addressInfo": { "addressId": 9, "city": "ignored" },
            "totalAmount": 1
        }))
        .unwrap()
    }

    #[test]
    fn test_merged_lines_combines_duplicates() {
        let req = request(serde_json::json!([
            { "productId": 1, "quantity": 2, "price": "0.01" },
            { "productId": 2, "quantity": 1 },
            { "productId": 1, "quantity": 3 }
        ]));
        let lines = req.merged_lines().unwrap();
        assert_eq!(lines.len(), 2);
        let first = lines.first().unwrap();
        assert_eq!(first.product_id, ProductId::new(1));
        assert_eq!(first.quantity, 5);
        assert_eq!(req.payment_method, PaymentMethod::Paypal);
    }

    #[test]
    fn test_merged_lines_rejects_empty_and_zero() {
        assert!(request(serde_json::json!([])).merged_lines().is_err());
        assert!(
            request(serde_json::json!([{ "productId": 1, "quantity": 0 }]))
                .merged_lines()
                .is_err()
        );
    }

    #[test]
    fn test_status_update_parse() {
        let update = OrderStatusUpdate {
            order_status: "inShipping".to_owned(),
        };
        assert_eq!(update.parse().unwrap(), OrderStatus::InShipping);

        let update = OrderStatusUpdate {
            order_status: "teleported".to_owned(),
        };
        assert!(update.parse().is_err());
    }

    #[test]
    fn test_capture_requires_ids() {
        let capture = CaptureRequest {
            payment_id: "PAYID-1".to_owned(),
            payer_id: String::new(),
            order_id: OrderId::new(1),
        };
        assert!(capture.validate().is_err());
    }
}
