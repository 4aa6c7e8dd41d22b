//! Food reviews.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use amork_core::{FoodId, ReviewId};

use crate::error::{ApiJson, ApiPath, Result};
use crate::middleware::RequireAuth;
use crate::models::{FoodReviews, ReviewEntry};
use crate::services::ReviewService;
use crate::state::AppState;

/// Request body for `POST /api/reviews`.
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub food_id: FoodId,
    pub rating: i64,
    pub comment: Option<String>,
}

/// GET /api/reviews/food/{food_id}
pub async fn for_food(
    State(state): State<AppState>,
    ApiPath(food_id): ApiPath<FoodId>,
) -> Result<Json<FoodReviews>> {
    let reviews = ReviewService::new(state.pool())
        .list_for_food(food_id)
        .await?;
    Ok(Json(reviews))
}

/// POST /api/reviews
///
/// Creates the caller's review of a food, or overwrites it.
#[tracing::instrument(skip_all, fields(user_id = %user.id, food_id = %body.food_id))]
pub async fn upsert(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(body): ApiJson<ReviewRequest>,
) -> Result<(StatusCode, Json<ReviewEntry>)> {
    let entry = ReviewService::new(state.pool())
        .upsert(user.id, body.food_id, body.rating, body.comment.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// DELETE /api/reviews/{id}
#[tracing::instrument(skip_all, fields(user_id = %user.id, review_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<ReviewId>,
) -> Result<StatusCode> {
    ReviewService::new(state.pool()).delete(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
