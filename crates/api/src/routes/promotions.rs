//! Promotion codes.

use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use amork_core::PromotionQuote;

use crate::error::{ApiJson, Result};
use crate::middleware::RequireAuth;
use crate::models::Promotion;
use crate::services::PromotionService;
use crate::services::promotions::PromotionDraft;
use crate::state::AppState;

/// Request body for `POST /api/promotions/validate`.
#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub code: String,
    pub order_amount: Decimal,
}

/// Request body for `POST /api/promotions`.
#[derive(Debug, Deserialize)]
pub struct CreatePromotionRequest {
    pub code: String,
    pub description: Option<String>,
    pub discount_percent: Decimal,
    pub is_active: Option<bool>,
    pub valid_until: Option<DateTime<Utc>>,
}

/// GET /api/promotions/active
pub async fn active(State(state): State<AppState>) -> Result<Json<Vec<Promotion>>> {
    let promotions = PromotionService::new(state.pool()).list_active().await?;
    Ok(Json(promotions))
}

/// POST /api/promotions/validate
///
/// # Errors
///
/// `failed_precondition` if the code is unknown, inactive or expired.
#[tracing::instrument(skip_all)]
pub async fn validate(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ValidateRequest>,
) -> Result<Json<PromotionQuote>> {
    let quote = PromotionService::new(state.pool())
        .validate(&body.code, body.order_amount)
        .await?;
    Ok(Json(quote))
}

/// POST /api/promotions
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(body): ApiJson<CreatePromotionRequest>,
) -> Result<(StatusCode, Json<Promotion>)> {
    let promotion = PromotionService::new(state.pool())
        .create(&PromotionDraft {
            code: &body.code,
            description: body.description.as_deref(),
            discount_percent: body.discount_percent,
            is_active: body.is_active.unwrap_or(true),
            valid_until: body.valid_until,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(promotion)))
}
