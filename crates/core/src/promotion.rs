//! Promotion codes and discount quotes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pricing::percent_of;
use crate::types::{MoneyError, round_money};

/// Reasons a promotion cannot be used.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PromotionError {
    #[error("promotion code is inactive")]
    Inactive,
    #[error("promotion code expired at {0}")]
    Expired(DateTime<Utc>),
    #[error("discount percent must be between 0 and 100, got {0}")]
    PercentOutOfRange(Decimal),
    #[error("promotion code cannot be empty")]
    EmptyCode,
    #[error(transparent)]
    Amount(#[from] MoneyError),
}

/// The parts of a promotion that decide whether and how much it discounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionTerms {
    pub discount_percent: Decimal,
    pub is_active: bool,
    pub valid_until: Option<DateTime<Utc>>,
}

/// Result of applying a promotion to an amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionQuote {
    pub discount_percent: Decimal,
    pub discount_amount: Decimal,
    pub new_total: Decimal,
}

impl PromotionTerms {
    /// Check that the promotion is usable at `now`.
    ///
    /// # Errors
    ///
    /// Returns `Inactive` when switched off and `Expired` when `valid_until`
    /// is not in the future.
    pub fn ensure_valid_at(&self, now: DateTime<Utc>) -> Result<(), PromotionError> {
        if !self.is_active {
            return Err(PromotionError::Inactive);
        }
        match self.valid_until {
            Some(until) if until <= now => Err(PromotionError::Expired(until)),
            _ => Ok(()),
        }
    }

    /// Quote the discount for `amount` at `now`.
    ///
    /// # Errors
    ///
    /// See [`ensure_valid_at`](Self::ensure_valid_at). Returns `Amount` if the
    /// discount cannot be computed for `amount`.
    pub fn quote(
        &self,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<PromotionQuote, PromotionError> {
        self.ensure_valid_at(now)?;
        let discount_amount = percent_of(amount, self.discount_percent)?;
        Ok(PromotionQuote {
            discount_percent: self.discount_percent,
            discount_amount,
            new_total: round_money(amount.saturating_sub(discount_amount)).max(Decimal::ZERO),
        })
    }
}

/// Validate the inputs of a new promotion, returning the trimmed code.
///
/// # Errors
///
/// Returns `EmptyCode` or `PercentOutOfRange`.
pub fn validate_new_promotion(code: &str, percent: Decimal) -> Result<&str, PromotionError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(PromotionError::EmptyCode);
    }
    if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
        return Err(PromotionError::PercentOutOfRange(percent));
    }
    Ok(code)
}
