//! Checkout: order creation and payment capture.
//!
//! Prices always come from the catalogue. Stock is only taken at capture,
//! inside the same transaction that marks the order paid and empties the
//! cart; a failed PayPal execution rolls all of it back.

use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use bazaar_core::{PaymentStatus, ProductId, line_total};

use crate::db::addresses::AddressRepository;
use crate::db::carts;
use crate::db::orders::{self, NewOrder, OrderRepository};
use crate::db::products::{self, ProductRepository, StockDecrement};
use crate::error::AppError;
use crate::models::CurrentUser;
use crate::models::order::{AddressInfo, CaptureRequest, CreateOrderRequest, Order, OrderItem};
use crate::services::paypal::{PaymentLine, PaypalClient};

/// Path on the client that PayPal redirects to after approval.
pub const PAYPAL_RETURN_PATH: &str = "/shop/paypal-return";

/// Path on the client that PayPal redirects to after cancellation.
pub const PAYPAL_CANCEL_PATH: &str = "/shop/paypal-cancel";

/// A stored order and the PayPal link the shopper must visit.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: Order,
    pub approval_url: String,
}

/// Order workflow service.
pub struct OrderService<'a> {
    pool: &'a PgPool,
    paypal: &'a PaypalClient,
    client_url: &'a str,
}

impl<'a> OrderService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, paypal: &'a PaypalClient, client_url: &'a str) -> Self {
        Self {
            pool,
            paypal,
            client_url,
        }
    }

    /// Price the requested lines, create the PayPal payment and store a
    /// pending order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` when ordering for another user.
    /// Returns `AppError::BadRequest` for an empty cart or bad quantities.
    /// Returns `AppError::NotFound` for an unknown product or address.
    /// Returns `AppError::Payment` if PayPal rejects the payment.
    #[instrument(skip(self, caller, request), fields(user_id = %request.user_id))]
    pub async fn place(
        &self,
        caller: &CurrentUser,
        request: &CreateOrderRequest,
    ) -> Result<PlacedOrder, AppError> {
        caller.ensure_can_access(request.user_id)?;
        let lines = request.merged_lines()?;

        let address = AddressRepository::new(self.pool)
            .get_for_user(request.user_id, request.address_info.address_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Address not found!".to_owned()))?;

        let ids: Vec<ProductId> = lines.iter().map(|l| l.product_id).collect();
        let catalogue = ProductRepository::new(self.pool).get_many(&ids).await?;

        let mut items = Vec::with_capacity(lines.len());
        let mut total = Decimal::ZERO;
        for line in &lines {
            let product = catalogue
                .iter()
                .find(|p| p.id == line.product_id)
                .ok_or_else(|| AppError::NotFound("Product not found!".to_owned()))?;
            let unit_price = product.unit_price();
            total += line_total(unit_price, line.quantity);
            items.push(OrderItem {
                product_id: product.id,
                title: product.title.clone(),
                image: product.image.clone(),
                price: unit_price,
                quantity: line.quantity,
            });
        }

        let payment_lines: Vec<PaymentLine<'_>> = items
            .iter()
            .map(|item| PaymentLine {
                name: &item.title,
                sku: item.product_id.to_string(),
                unit_price: item.price,
                quantity: item.quantity,
            })
            .collect();
        let return_url = format!("{}{PAYPAL_RETURN_PATH}", self.client_url);
        let cancel_url = format!("{}{PAYPAL_CANCEL_PATH}", self.client_url);
        let payment = self
            .paypal
            .create_payment(&payment_lines, total, &return_url, &cancel_url)
            .await?;

        let order = OrderRepository::new(self.pool)
            .create(&NewOrder {
                user_id: request.user_id,
                cart_id: request.cart_id,
                address: AddressInfo {
                    address_id: Some(address.id),
                    address: address.address,
                    city: address.city,
                    pincode: address.pincode,
                    phone: address.phone,
                    notes: address.notes,
                },
                items,
                total_amount: total,
                payment_method: request.payment_method,
                payment_id: payment.id,
            })
            .await?;

        tracing::info!(order_id = %order.id, total = %order.total_amount, "Order placed");
        Ok(PlacedOrder {
            order,
            approval_url: payment.approval_url,
        })
    }

    /// Execute the PayPal payment and confirm the order atomically.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown order or a deleted product.
    /// Returns `AppError::Forbidden` when capturing another user's order.
    /// Returns `AppError::Conflict` if already paid or stock is short.
    /// Returns `AppError::Payment` if PayPal fails to execute the payment.
    #[instrument(skip(self, caller, request), fields(order_id = %request.order_id))]
    pub async fn capture(
        &self,
        caller: &CurrentUser,
        request: &CaptureRequest,
    ) -> Result<Order, AppError> {
        request.validate()?;

        let mut tx = self.pool.begin().await?;

        let locked = orders::lock_for_capture(&mut *tx, request.order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))?;
        caller.ensure_can_access(locked.user_id)?;

        if locked.payment_status == PaymentStatus::Completed {
            return Err(AppError::Conflict("Order already paid".to_owned()));
        }
        if locked.payment_id.as_deref() != Some(request.payment_id.trim()) {
            return Err(AppError::BadRequest(
                "Payment does not match this order".to_owned(),
            ));
        }

        for item in &locked.items {
            match products::decrement_stock(&mut *tx, item.product_id, item.quantity).await? {
                StockDecrement::Applied => {}
                StockDecrement::Insufficient => {
                    return Err(AppError::Conflict(format!(
                        "Not enough stock for product {}",
                        item.title
                    )));
                }
                StockDecrement::Missing => {
                    return Err(AppError::NotFound(format!(
                        "Product not found: {}",
                        item.title
                    )));
                }
            }
        }

        self.paypal
            .execute_payment(request.payment_id.trim(), request.payer_id.trim())
            .await?;

        let order = orders::mark_paid(
            &mut *tx,
            locked.id,
            request.payment_id.trim(),
            request.payer_id.trim(),
        )
        .await?;
        carts::clear_for_user(&mut *tx, locked.user_id).await?;

        if let Err(e) = tx.commit().await {
            tracing::error!(
                order_id = %locked.id,
                payment_id = %request.payment_id,
                error = %e,
                "PayPal payment executed but order commit failed"
            );
            return Err(e.into());
        }

        tracing::info!(order_id = %order.id, "Payment captured");
        Ok(order)
    }
}
