//! Promotion codes.

use amork_core::promotion::validate_new_promotion;
use amork_core::{PromotionError, PromotionQuote};
use amork_core::types::money::validate_price;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use super::ServiceError;
use crate::db::PromotionRepository;
use crate::db::promotions::NewPromotion;
use crate::models::Promotion;

/// Input for a new promotion.
#[derive(Debug)]
pub struct PromotionDraft<'a> {
    pub code: &'a str,
    pub description: Option<&'a str>,
    pub discount_percent: Decimal,
    pub is_active: bool,
    pub valid_until: Option<DateTime<Utc>>,
}

/// Promotion operations.
pub struct PromotionService<'a> {
    promotions: PromotionRepository<'a>,
}

impl<'a> PromotionService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            promotions: PromotionRepository::new(pool),
        }
    }

    /// Active, unexpired promotions, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the query fails.
    pub async fn list_active(&self) -> Result<Vec<Promotion>, ServiceError> {
        Ok(self.promotions.list_active(Utc::now()).await?)
    }

    /// Quote the discount a code gives on `order_amount`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::FailedPrecondition` if the code is unknown,
    /// inactive or expired.
    /// Returns `ServiceError::InvalidArgument` for a negative amount or one
    /// that does not fit a money column.
    #[tracing::instrument(skip(self))]
    pub async fn validate(
        &self,
        code: &str,
        order_amount: Decimal,
    ) -> Result<PromotionQuote, ServiceError> {
        validate_price(order_amount)
            .map_err(|e| ServiceError::InvalidArgument(format!("order_amount: {e}")))?;

        let code = code.trim();
        let promotion = self
            .promotions
            .find_by_code(code)
            .await?
            .ok_or_else(|| ServiceError::FailedPrecondition(format!("invalid promo code: {code}")))?;

        promotion
            .terms()
            .quote(order_amount, Utc::now())
            .map_err(|e| match e {
                PromotionError::Amount(e) => {
                    ServiceError::InvalidArgument(format!("order_amount: {e}"))
                }
                e => ServiceError::FailedPrecondition(format!("promo code {code}: {e}")),
            })
    }

    /// Create a promotion.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::InvalidArgument` for an empty code or a percent
    /// outside 0..=100.
    /// Returns `ServiceError::AlreadyExists` if the code is taken.
    #[tracing::instrument(skip(self, draft), fields(code = draft.code))]
    pub async fn create(&self, draft: &PromotionDraft<'_>) -> Result<Promotion, ServiceError> {
        let code = validate_new_promotion(draft.code, draft.discount_percent)
            .map_err(|e| ServiceError::InvalidArgument(e.to_string()))?;

        let promotion = self
            .promotions
            .create(&NewPromotion {
                code,
                description: draft.description.map(str::trim).filter(|d| !d.is_empty()),
                discount_percent: draft.discount_percent,
                is_active: draft.is_active,
                valid_until: draft.valid_until,
            })
            .await
            .map_err(ServiceError::or_not_found("promotion"))?;

        tracing::info!(promotion_id = %promotion.id, "promotion created");
        Ok(promotion)
    }
}
