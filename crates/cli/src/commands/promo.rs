//! Promotion code management.

use amork_api::services::{PromotionService, ServiceError};
use amork_api::services::promotions::PromotionDraft;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur during promotion commands.
#[derive(Debug, Error)]
pub enum PromoError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// `--valid-days` must be positive.
    #[error("valid days must be at least 1, got {0}")]
    InvalidValidity(i64),

    /// Validation or persistence failed.
    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Create a promotion code.
///
/// # Errors
///
/// Returns `PromoError::Service` for an invalid or duplicate code.
pub async fn create(
    code: &str,
    percent: Decimal,
    description: Option<&str>,
    valid_days: Option<i64>,
    is_active: bool,
) -> Result<(), PromoError> {
    let valid_until = match valid_days {
        Some(days) if days < 1 => return Err(PromoError::InvalidValidity(days)),
        Some(days) => Some(Utc::now() + Duration::days(days)),
        None => None,
    };

    let url = super::database_url().map_err(PromoError::MissingEnvVar)?;
    let pool = super::connect(&url).await?;

    let promotion = PromotionService::new(&pool)
        .create(&PromotionDraft {
            code,
            description,
            discount_percent: percent,
            is_active,
            valid_until,
        })
        .await?;

    tracing::info!(
        code = %promotion.code,
        percent = %promotion.discount_percent,
        valid_until = ?promotion.valid_until,
        "Promotion created"
    );
    Ok(())
}
