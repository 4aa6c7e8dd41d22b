//! Menu catalog models.

use amork_core::{CategoryId, FoodId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A menu category such as "Burgers" or "Drinks".
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A menu item.
///
/// `rating` is derived from reviews and only written by the rating
/// aggregation.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Food {
    pub id: FoodId,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub image_url: String,
    pub category_id: CategoryId,
    pub calories: i32,
    pub cooking_time: String,
    pub rating: Decimal,
    pub is_popular: bool,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
