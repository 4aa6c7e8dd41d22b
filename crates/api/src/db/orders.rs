//! Order repository.
//!
//! Orders and their items are written once, inside the placement
//! transaction. Afterwards only `status` (and `updated_at`) ever change.

use amork_core::{
    FoodId, OrderId, OrderItemId, OrderStatus, OrderTotals, PaymentMethod, PaymentStatus, UserId,
};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use super::RepositoryError;
use crate::models::{Order, OrderItem};

const ORDER_COLUMNS: &str = "id, user_id, order_number, status, payment_method, payment_status, \
                             delivery_street, delivery_city, delivery_phone, note, subtotal, \
                             delivery_fee, tax, discount, total, promo_code, created_at, \
                             updated_at";

const ITEM_COLUMNS: &str =
    "id, line_number, food_id, food_name, quantity, unit_price, subtotal, special_instructions";

/// Header fields of a new order.
#[derive(Debug)]
pub struct NewOrder<'a> {
    pub user_id: UserId,
    pub order_number: &'a str,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub delivery_street: Option<&'a str>,
    pub delivery_city: Option<&'a str>,
    pub delivery_phone: Option<&'a str>,
    pub note: Option<&'a str>,
    pub totals: OrderTotals,
    pub promo_code: Option<&'a str>,
}

/// A line about to be snapshotted into an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub food_id: FoodId,
    pub food_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
    pub special_instructions: Option<String>,
}

/// Repository for orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders
             WHERE user_id = $1
             ORDER BY created_at DESC, id"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(orders)
    }

    /// One of the user's orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_user(
        &self,
        user_id: UserId,
        id: OrderId,
    ) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(order)
    }

    /// Lines of an order in placement order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let items = sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY line_number"
        ))
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;
        Ok(items)
    }

    /// Move an order from `from` to `to`, only if it is still at `from`.
    ///
    /// Returns `None` when the order is missing, not owned by the user, or
    /// its status changed since it was read.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn compare_and_set_status(
        &self,
        user_id: UserId,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET status = $4, updated_at = NOW()
             WHERE id = $1 AND user_id = $2 AND status = $3
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_optional(self.pool)
        .await?;
        Ok(order)
    }

    /// Insert an order header inside a transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order number is taken.
    pub async fn insert(
        conn: &mut PgConnection,
        new: &NewOrder<'_>,
    ) -> Result<Order, RepositoryError> {
        sqlx::query_as::<_, Order>(&format!(
            "INSERT INTO orders (id, user_id, order_number, status, payment_method,
                                 payment_status, delivery_street, delivery_city,
                                 delivery_phone, note, subtotal, delivery_fee, tax,
                                 discount, total, promo_code)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(OrderId::generate())
        .bind(new.user_id)
        .bind(new.order_number)
        .bind(new.status)
        .bind(new.payment_method)
        .bind(new.payment_status)
        .bind(new.delivery_street)
        .bind(new.delivery_city)
        .bind(new.delivery_phone)
        .bind(new.note)
        .bind(new.totals.subtotal)
        .bind(new.totals.delivery_fee)
        .bind(new.totals.tax)
        .bind(new.totals.discount)
        .bind(new.totals.total)
        .bind(new.promo_code)
        .fetch_one(conn)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "order number"))
    }

    /// Insert the snapshot lines of an order inside a transaction.
    ///
    /// Lines are numbered from 1 in the given order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if an insert fails.
    pub async fn insert_items(
        conn: &mut PgConnection,
        order_id: OrderId,
        items: &[NewOrderItem],
    ) -> Result<Vec<OrderItem>, RepositoryError> {
        let mut inserted = Vec::with_capacity(items.len());
        for (line_number, item) in (1_i32..).zip(items) {
            let row = sqlx::query_as::<_, OrderItem>(&format!(
                "INSERT INTO order_items (id, order_id, line_number, food_id, food_name,
                                          quantity, unit_price, subtotal, special_instructions)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                 RETURNING {ITEM_COLUMNS}"
            ))
            .bind(OrderItemId::generate())
            .bind(order_id)
            .bind(line_number)
            .bind(item.food_id)
            .bind(&item.food_name)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.subtotal)
            .bind(item.special_instructions.as_deref())
            .fetch_one(&mut *conn)
            .await?;
            inserted.push(row);
        }
        Ok(inserted)
    }
}
