//! Promotion repository.

use amork_core::PromotionId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use super::RepositoryError;
use crate::models::Promotion;

const PROMOTION_COLUMNS: &str =
    "id, code, description, discount_percent, is_active, valid_until, created_at";

/// Fields for a new promotion.
#[derive(Debug)]
pub struct NewPromotion<'a> {
    pub code: &'a str,
    pub description: Option<&'a str>,
    pub discount_percent: Decimal,
    pub is_active: bool,
    pub valid_until: Option<DateTime<Utc>>,
}

/// Repository for discount codes.
pub struct PromotionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PromotionRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Active, unexpired promotions, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(&self, now: DateTime<Utc>) -> Result<Vec<Promotion>, RepositoryError> {
        let rows = sqlx::query_as::<_, Promotion>(&format!(
            "SELECT {PROMOTION_COLUMNS} FROM promotions
             WHERE is_active AND (valid_until IS NULL OR valid_until > $1)
             ORDER BY created_at DESC, id"
        ))
        .bind(now)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Look up a promotion by its exact code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_code(&self, code: &str) -> Result<Option<Promotion>, RepositoryError> {
        Self::find_by_code_in(&mut *self.pool.acquire().await?, code).await
    }

    /// Look up a promotion by its exact code on a given connection.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_code_in(
        conn: &mut PgConnection,
        code: &str,
    ) -> Result<Option<Promotion>, RepositoryError> {
        let row = sqlx::query_as::<_, Promotion>(&format!(
            "SELECT {PROMOTION_COLUMNS} FROM promotions WHERE code = $1"
        ))
        .bind(code)
        .fetch_optional(conn)
        .await?;
        Ok(row)
    }

    /// Create a promotion.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the code is taken.
    pub async fn create(&self, new: &NewPromotion<'_>) -> Result<Promotion, RepositoryError> {
        sqlx::query_as::<_, Promotion>(&format!(
            "INSERT INTO promotions (id, code, description, discount_percent, is_active, valid_until)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {PROMOTION_COLUMNS}"
        ))
        .bind(PromotionId::generate())
        .bind(new.code)
        .bind(new.description)
        .bind(new.discount_percent)
        .bind(new.is_active)
        .bind(new.valid_until)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "promotion code"))
    }
}
