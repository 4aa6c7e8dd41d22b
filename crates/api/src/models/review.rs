//! Review models.

use amork_core::{FoodId, ReviewId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// A review with the reviewer's display name.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ReviewEntry {
    pub id: ReviewId,
    pub user_id: UserId,
    pub food_id: FoodId,
    pub rating: i16,
    pub comment: Option<String>,
    pub reviewer_name: String,
    pub created_at: DateTime<Utc>,
}

/// All reviews of a food, newest first, with their mean.
#[derive(Debug, Clone, Serialize)]
pub struct FoodReviews {
    pub food_id: FoodId,
    pub average_rating: Decimal,
    pub review_count: usize,
    pub reviews: Vec<ReviewEntry>,
}
