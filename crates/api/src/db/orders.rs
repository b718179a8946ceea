//! Order repository.
//!
//! An order is one `customer_order` row plus its `customer_order_item`
//! lines. Reads assemble both into an [`Order`]. The capture flow uses the
//! connection-level functions at the bottom of this module inside a single
//! transaction.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use bazaar_core::{
    AddressId, CartId, OrderId, OrderStatus, PaymentMethod, PaymentStatus, ProductId, UserId,
};

use super::{RepositoryError, conflict_on_unique};
use crate::models::order::{AddressInfo, Order, OrderItem};

const ORDER_COLUMNS: &str = "id, user_id, cart_id, address_id, address, city, pincode, phone, \
     notes, order_status, payment_method, payment_status, total_amount, payment_id, payer_id, \
     order_date, order_update_date";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    cart_id: Option<CartId>,
    address_id: Option<AddressId>,
    address: String,
    city: String,
    pincode: String,
    phone: String,
    notes: Option<String>,
    order_status: OrderStatus,
    payment_method: PaymentMethod,
    payment_status: PaymentStatus,
    total_amount: Decimal,
    payment_id: Option<String>,
    payer_id: Option<String>,
    order_date: DateTime<Utc>,
    order_update_date: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, cart_items: Vec<OrderItem>) -> Order {
        Order {
            id: self.id,
            user_id: self.user_id,
            cart_id: self.cart_id,
            cart_items,
            address_info: AddressInfo {
                address_id: self.address_id,
                address: self.address,
                city: self.city,
                pincode: self.pincode,
                phone: self.phone,
                notes: self.notes,
            },
            order_status: self.order_status,
            payment_method: self.payment_method,
            payment_status: self.payment_status,
            total_amount: self.total_amount,
            payment_id: self.payment_id,
            payer_id: self.payer_id,
            order_date: self.order_date,
            order_update_date: self.order_update_date,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    order_id: OrderId,
    #[sqlx(flatten)]
    item: OrderItem,
}

/// A new order ready to be stored.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub cart_id: Option<CartId>,
    pub address: AddressInfo,
    pub items: Vec<OrderItem>,
    pub total_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_id: String,
}

/// The parts of a locked order the capture flow needs.
#[derive(Debug, Clone)]
pub struct LockedOrder {
    pub id: OrderId,
    pub user_id: UserId,
    pub payment_status: PaymentStatus,
    pub payment_id: Option<String>,
    pub items: Vec<OrderItem>,
}

async fn items_for_orders(
    conn: &mut PgConnection,
    ids: &[OrderId],
) -> Result<HashMap<OrderId, Vec<OrderItem>>, RepositoryError> {
    let rows = sqlx::query_as::<_, OrderItemRow>(
        r"
        SELECT order_id, product_id, title, image, price, quantity
        FROM shop.customer_order_item
        WHERE order_id = ANY($1)
        ORDER BY order_id, product_id
        ",
    )
    .bind(ids)
    .fetch_all(conn)
    .await?;

    let mut grouped: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
    for row in rows {
        grouped.entry(row.order_id).or_default().push(row.item);
    }
    Ok(grouped)
}

async fn assemble(
    conn: &mut PgConnection,
    rows: Vec<OrderRow>,
) -> Result<Vec<Order>, RepositoryError> {
    let ids: Vec<OrderId> = rows.iter().map(|r| r.id).collect();
    let mut items = items_for_orders(conn, &ids).await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let lines = items.remove(&row.id).unwrap_or_default();
            row.into_order(lines)
        })
        .collect())
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store an order and its lines atomically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the payment ID is already in use.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            INSERT INTO shop.customer_order
                (user_id, cart_id, address_id, address, city, pincode, phone, notes,
                 payment_method, total_amount, payment_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(order.user_id)
        .bind(order.cart_id)
        .bind(order.address.address_id)
        .bind(&order.address.address)
        .bind(&order.address.city)
        .bind(&order.address.pincode)
        .bind(&order.address.phone)
        .bind(&order.address.notes)
        .bind(order.payment_method)
        .bind(order.total_amount)
        .bind(&order.payment_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, "payment already linked to an order"))?;

        if !order.items.is_empty() {
            let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(
                "INSERT INTO shop.customer_order_item (order_id, product_id, title, image, price, quantity) ",
            );
            qb.push_values(&order.items, |mut b, item| {
                b.push_bind(row.id)
                    .push_bind(item.product_id)
                    .push_bind(&item.title)
                    .push_bind(&item.image)
                    .push_bind(item.price)
                    .push_bind(item.quantity);
            });
            qb.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;

        Ok(row.into_order(order.items.clone()))
    }

    /// Get an order with its lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.customer_order WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        match row {
            Some(row) => Ok(assemble(&mut *conn, vec![row]).await?.into_iter().next()),
            None => Ok(None),
        }
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS} FROM shop.customer_order
            WHERE user_id = $1
            ORDER BY order_date DESC, id DESC
            "
        ))
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?;

        assemble(&mut *conn, rows).await
    }

    /// List every order, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.customer_order ORDER BY order_date DESC, id DESC"
        ))
        .fetch_all(&mut *conn)
        .await?;

        assemble(&mut *conn, rows).await
    }

    /// Set an order's status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            UPDATE shop.customer_order
            SET order_status = $2, order_update_date = NOW()
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        assemble(&mut *conn, vec![row])
            .await?
            .into_iter()
            .next()
            .ok_or(RepositoryError::NotFound)
    }

    /// Whether a user has a paid order containing a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn has_completed_purchase(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let purchased = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS(
                SELECT 1
                FROM shop.customer_order o
                JOIN shop.customer_order_item i ON i.order_id = o.id
                WHERE o.user_id = $1
                  AND i.product_id = $2
                  AND o.payment_status = 'completed'
            )
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_one(self.pool)
        .await?;

        Ok(purchased)
    }
}

/// Lock an order row for the rest of the transaction and load its lines.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if a query fails.
pub async fn lock_for_capture(
    conn: &mut PgConnection,
    id: OrderId,
) -> Result<Option<LockedOrder>, RepositoryError> {
    let row = sqlx::query_as::<_, (OrderId, UserId, PaymentStatus, Option<String>)>(
        r"
        SELECT id, user_id, payment_status, payment_id
        FROM shop.customer_order
        WHERE id = $1
        FOR UPDATE
        ",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some((id, user_id, payment_status, payment_id)) = row else {
        return Ok(None);
    };

    let items = items_for_orders(conn, &[id])
        .await?
        .remove(&id)
        .unwrap_or_default();

    Ok(Some(LockedOrder {
        id,
        user_id,
        payment_status,
        payment_id,
        items,
    }))
}

/// Record a completed payment and confirm the order.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the order does not exist.
/// Returns `RepositoryError::Database` if the update fails.
pub async fn mark_paid(
    conn: &mut PgConnection,
    id: OrderId,
    payment_id: &str,
    payer_id: &str,
) -> Result<Order, RepositoryError> {
    let row = sqlx::query_as::<_, OrderRow>(&format!(
        r"
        UPDATE shop.customer_order
        SET payment_status = 'completed',
            order_status = 'confirmed',
            payment_id = $2,
            payer_id = $3,
            order_update_date = NOW()
        WHERE id = $1
        RETURNING {ORDER_COLUMNS}
        "
    ))
    .bind(id)
    .bind(payment_id)
    .bind(payer_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(RepositoryError::NotFound)?;

    assemble(conn, vec![row])
        .await?
        .into_iter()
        .next()
        .ok_or(RepositoryError::NotFound)
}
