//! Favorite foods.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use amork_core::FoodId;

use crate::db::FavoriteRepository;
use crate::error::{ApiJson, ApiPath, Result};
use crate::middleware::RequireAuth;
use crate::models::FavoriteFood;
use crate::services::ServiceError;
use crate::state::AppState;

/// Request body for `POST /api/favorites`.
#[derive(Debug, Deserialize)]
pub struct AddFavoriteRequest {
    pub food_id: FoodId,
}

/// Response for `POST /api/favorites`.
#[derive(Debug, Serialize)]
pub struct FavoriteAdded {
    pub food_id: FoodId,
    pub already_favorite: bool,
}

/// Response for `GET /api/favorites/{food_id}/check`.
#[derive(Debug, Serialize)]
pub struct FavoriteCheck {
    pub food_id: FoodId,
    pub is_favorite: bool,
}

/// GET /api/favorites
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<FavoriteFood>>> {
    let favorites = FavoriteRepository::new(state.pool()).list(user.id).await?;
    Ok(Json(favorites))
}

/// POST /api/favorites
///
/// Idempotent: adding a favorite twice reports `already_favorite`.
#[tracing::instrument(skip_all, fields(user_id = %user.id, food_id = %body.food_id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(body): ApiJson<AddFavoriteRequest>,
) -> Result<(StatusCode, Json<FavoriteAdded>)> {
    let inserted = FavoriteRepository::new(state.pool())
        .add(user.id, body.food_id)
        .await
        .map_err(ServiceError::or_not_found("food"))?;

    let status = if inserted {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(FavoriteAdded {
            food_id: body.food_id,
            already_favorite: !inserted,
        }),
    ))
}

/// DELETE /api/favorites/{food_id}
#[tracing::instrument(skip_all, fields(user_id = %user.id, food_id = %food_id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(food_id): ApiPath<FoodId>,
) -> Result<StatusCode> {
    FavoriteRepository::new(state.pool())
        .remove(user.id, food_id)
        .await
        .map_err(ServiceError::or_not_found("favorite"))?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/favorites/{food_id}/check
pub async fn check(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(food_id): ApiPath<FoodId>,
) -> Result<Json<FavoriteCheck>> {
    let is_favorite = FavoriteRepository::new(state.pool())
        .contains(user.id, food_id)
        .await?;
    Ok(Json(FavoriteCheck {
        food_id,
        is_favorite,
    }))
}
