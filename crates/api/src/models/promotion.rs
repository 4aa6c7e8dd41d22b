use amork_core::{PromotionId, PromotionTerms};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// A discount code.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Promotion {
    pub id: PromotionId,
    pub code: String,
    pub description: Option<String>,
    pub discount_percent: Decimal,
    pub is_active: bool,
    pub valid_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Promotion {
    #[must_use]
    pub fn terms(&self) -> PromotionTerms {
        PromotionTerms {
            discount_percent: self.discount_percent,
            is_active: self.is_active,
            valid_until: self.valid_until,
        }
    }
}
