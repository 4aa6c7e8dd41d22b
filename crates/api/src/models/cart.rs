//! Cart models.

use amork_core::{CartItemId, FoodId, MoneyError, PricedLine};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// A cart row joined with the live attributes of its food.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CartLine {
    pub id: CartItemId,
    pub food_id: FoodId,
    pub food_name: String,
    pub price: Decimal,
    pub image_url: String,
    pub calories: i32,
    pub cooking_time: String,
    pub quantity: i32,
    pub special_instructions: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CartLine {
    #[must_use]
    pub const fn priced(&self) -> PricedLine {
        PricedLine::new(self.price, self.quantity)
    }
}

/// A cart line with its computed subtotal.
#[derive(Debug, Clone, Serialize)]
pub struct CartEntry {
    #[serde(flatten)]
    pub line: CartLine,
    pub subtotal: Decimal,
}

/// The whole cart as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartEntry>,
    pub total: Decimal,
    pub item_count: i64,
}

impl CartView {
    /// Build the view, computing subtotals and totals from live prices.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::Overflow` if a total leaves the decimal range.
    pub fn from_lines(lines: Vec<CartLine>) -> Result<Self, MoneyError> {
        let priced: Vec<PricedLine> = lines.iter().map(CartLine::priced).collect();
        let total = amork_core::cart_total(&priced)?;
        let item_count = amork_core::pricing::item_count(&priced);
        let items = lines
            .into_iter()
            .map(|line| -> Result<CartEntry, MoneyError> {
                Ok(CartEntry {
                    subtotal: line.priced().subtotal()?,
                    line,
                })
            })
            .collect::<Result<_, _>>()?;

        Ok(Self {
            items,
            total,
            item_count,
        })
    }
}
