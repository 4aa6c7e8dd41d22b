//! Order placement and lifecycle.
//!
//! Placement turns either the caller's cart or an explicit list of lines into
//! an order in a single transaction:
//!
//! 1. resolve lines (cart rows are locked with `FOR UPDATE`)
//! 2. reject an empty line set
//! 3. snapshot food name and unit price into each line
//! 4. compute totals with `amork_core::OrderTotals`
//! 5. insert the order and its items, delete consumed cart rows, commit
//!
//! Any error before the commit drops the transaction, which rolls it back.

use std::collections::HashMap;

use amork_core::order_number::generate_order_number;
use amork_core::pricing::check_quantity;
use amork_core::types::money::validate_price;
use amork_core::{
    CartItemId, FoodId, OrderId, OrderStatus, OrderTotals, PaymentMethod, PaymentStatus,
    PricedLine, UserId,
};
use chrono::Utc;
use rand::Rng;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use super::ServiceError;
use crate::config::PricingConfig;
use crate::db::orders::{NewOrder, NewOrderItem};
use crate::db::{CartRepository, FoodRepository, OrderRepository, PromotionRepository};
use crate::models::{Order, OrderDetail};

/// An explicit line supplied by the client instead of the cart.
#[derive(Debug, Clone)]
pub struct OrderLineInput {
    pub food_id: FoodId,
    /// Defaults to the food's current name.
    pub food_name: Option<String>,
    pub quantity: i32,
    /// Defaults to the food's current price.
    pub unit_price: Option<Decimal>,
    pub special_instructions: Option<String>,
}

/// Input for placing an order.
#[derive(Debug, Clone, Default)]
pub struct PlaceOrder {
    /// Explicit lines; `None` or empty means "check out the cart".
    pub items: Option<Vec<OrderLineInput>>,
    pub delivery_street: Option<String>,
    pub delivery_city: Option<String>,
    pub delivery_phone: Option<String>,
    pub note: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub promo_code: Option<String>,
}

/// Order operations.
pub struct OrderService<'a> {
    pool: &'a PgPool,
    orders: OrderRepository<'a>,
    pricing: PricingConfig,
}

impl<'a> OrderService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, pricing: PricingConfig) -> Self {
        Self {
            pool,
            orders: OrderRepository::new(pool),
            pricing,
        }
    }

    /// Place an order for the user.
    ///
    /// # Errors
    ///
    /// - `FailedPrecondition` if there are no lines or the promo code is
    ///   unknown, inactive or expired
    /// - `NotFound` if an explicit line names an unknown food
    /// - `InvalidArgument` for a quantity outside `1..=MAX_LINE_QUANTITY`, a
    ///   bad unit price or totals too large to store
    /// - `AlreadyExists` if the generated order number collides
    #[tracing::instrument(skip(self, input), fields(order_number))]
    pub async fn place(
        &self,
        user_id: UserId,
        input: PlaceOrder,
    ) -> Result<OrderDetail, ServiceError> {
        let mut tx = self.pool.begin().await?;

        let explicit = input.items.filter(|items| !items.is_empty());
        let (lines, consumed_cart) = match explicit {
            Some(items) => (resolve_explicit_lines(&mut tx, items).await?, Vec::new()),
            None => cart_lines(&mut tx, user_id).await?,
        };

        if lines.is_empty() {
            return Err(ServiceError::FailedPrecondition(
                "cannot place an order with no items".to_string(),
            ));
        }

        let promo_code = input
            .promo_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());
        let discount_percent = match promo_code {
            Some(code) => Some(promotion_percent(&mut tx, code).await?),
            None => None,
        };

        let priced: Vec<PricedLine> = lines
            .iter()
            .map(|l| PricedLine::new(l.unit_price, l.quantity))
            .collect();
        let totals = OrderTotals::compute(
            &priced,
            self.pricing.delivery_fee,
            self.pricing.tax,
            discount_percent,
        )?;

        let order_number = new_order_number();
        tracing::Span::current().record("order_number", order_number.as_str());

        let order = OrderRepository::insert(
            &mut tx,
            &NewOrder {
                user_id,
                order_number: &order_number,
                status: OrderStatus::INITIAL,
                payment_method: input.payment_method.unwrap_or_default(),
                payment_status: PaymentStatus::Paid,
                delivery_street: input.delivery_street.as_deref(),
                delivery_city: input.delivery_city.as_deref(),
                delivery_phone: input.delivery_phone.as_deref(),
                note: input.note.as_deref(),
                totals,
                promo_code,
            },
        )
        .await
        .map_err(ServiceError::from_conflict)?;

        let items = OrderRepository::insert_items(&mut tx, order.id, &lines).await?;

        if !consumed_cart.is_empty() {
            CartRepository::delete_lines(&mut tx, user_id, &consumed_cart).await?;
        }

        tx.commit().await?;

        tracing::info!(
            order_id = %order.id,
            total = %order.total,
            lines = items.len(),
            "order placed"
        );

        Ok(OrderDetail { order, items })
    }

    /// The user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Order>, ServiceError> {
        Ok(self.orders.list_for_user(user_id).await?)
    }

    /// One of the user's orders with its lines.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the user has no such order.
    pub async fn get(&self, user_id: UserId, id: OrderId) -> Result<OrderDetail, ServiceError> {
        let order = self
            .orders
            .get_for_user(user_id, id)
            .await?
            .ok_or(ServiceError::NotFound("order"))?;
        let items = self.orders.items(order.id).await?;
        Ok(OrderDetail { order, items })
    }

    /// Move an order to `to`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the user has no such order.
    /// Returns `ServiceError::FailedPrecondition` if the transition is not
    /// allowed or the status changed concurrently.
    #[tracing::instrument(skip(self))]
    pub async fn update_status(
        &self,
        user_id: UserId,
        id: OrderId,
        to: OrderStatus,
    ) -> Result<Order, ServiceError> {
        let current = self
            .orders
            .get_for_user(user_id, id)
            .await?
            .ok_or(ServiceError::NotFound("order"))?;

        current
            .status
            .transition_to(to)
            .map_err(|e| ServiceError::FailedPrecondition(e.to_string()))?;

        let updated = self
            .orders
            .compare_and_set_status(user_id, id, current.status, to)
            .await?
            .ok_or_else(|| {
                ServiceError::FailedPrecondition(
                    "order status changed concurrently, reload and retry".to_string(),
                )
            })?;

        tracing::info!(from = %current.status, to = %to, "order status changed");
        Ok(updated)
    }

    /// Cancel an order that has not left the kitchen.
    ///
    /// # Errors
    ///
    /// See [`update_status`](Self::update_status).
    pub async fn cancel(&self, user_id: UserId, id: OrderId) -> Result<Order, ServiceError> {
        self.update_status(user_id, id, OrderStatus::Cancelled).await
    }
}

/// Build a fresh order number from the current time and a random suffix.
fn new_order_number() -> String {
    let mut rng = rand::rng();
    generate_order_number(Utc::now(), |len| rng.random_range(0..len))
}

/// Lock and snapshot the user's cart. Returns the lines and the cart rows
/// they consume.
async fn cart_lines(
    conn: &mut PgConnection,
    user_id: UserId,
) -> Result<(Vec<NewOrderItem>, Vec<CartItemId>), ServiceError> {
    let cart = CartRepository::lock_lines(conn, user_id).await?;
    let consumed = cart.iter().map(|line| line.id).collect();
    let lines = cart
        .into_iter()
        .map(|line| -> Result<NewOrderItem, ServiceError> {
            let subtotal = line.priced().subtotal()?;
            Ok(NewOrderItem {
                food_id: line.food_id,
                food_name: line.food_name,
                quantity: line.quantity,
                unit_price: line.price,
                subtotal,
                special_instructions: line.special_instructions,
            })
        })
        .collect::<Result<_, _>>()?;
    Ok((lines, consumed))
}

/// Validate explicit lines and fill in missing names and prices.
async fn resolve_explicit_lines(
    conn: &mut PgConnection,
    items: Vec<OrderLineInput>,
) -> Result<Vec<NewOrderItem>, ServiceError> {
    for item in &items {
        check_quantity(item.quantity)?;
        if let Some(price) = item.unit_price {
            validate_price(price)
                .map_err(|e| ServiceError::InvalidArgument(format!("unit_price: {e}")))?;
        }
    }

    let ids: Vec<FoodId> = items.iter().map(|i| i.food_id).collect();
    let known: HashMap<FoodId, (String, Decimal)> = FoodRepository::prices_in(conn, &ids)
        .await?
        .into_iter()
        .map(|f| (f.id, (f.name, f.price)))
        .collect();

    items
        .into_iter()
        .map(|item| -> Result<NewOrderItem, ServiceError> {
            let (name, price) = known
                .get(&item.food_id)
                .ok_or(ServiceError::NotFound("food"))?;
            let food_name = item
                .food_name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| name.clone());
            let unit_price = item.unit_price.unwrap_or(*price);
            Ok(NewOrderItem {
                food_id: item.food_id,
                food_name,
                quantity: item.quantity,
                unit_price,
                subtotal: PricedLine::new(unit_price, item.quantity).subtotal()?,
                special_instructions: item.special_instructions,
            })
        })
        .collect()
}

/// Discount percent of a usable promotion code.
async fn promotion_percent(conn: &mut PgConnection, code: &str) -> Result<Decimal, ServiceError> {
    let promotion = PromotionRepository::find_by_code_in(conn, code)
        .await?
        .ok_or_else(|| ServiceError::FailedPrecondition(format!("invalid promo code: {code}")))?;

    promotion
        .terms()
        .ensure_valid_at(Utc::now())
        .map_err(|e| ServiceError::FailedPrecondition(format!("promo code {code}: {e}")))?;

    Ok(promotion.discount_percent)
}

#[cfg(test)]
mod tests {
    use amork_core::order_number::is_order_number;

    use super::*;

    #[test]
    fn test_new_order_number_shape() {
        let a = new_order_number();
        assert!(is_order_number(&a), "{a}");
        assert!(a.starts_with("AMK-"));
    }
}
