use amork_core::FavoriteId;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Food;

/// A favorite joined with its food.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct FavoriteFood {
    pub favorite_id: FavoriteId,
    pub favorited_at: DateTime<Utc>,
    #[sqlx(flatten)]
    pub food: Food,
}
