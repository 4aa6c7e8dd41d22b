//! Menu items.

use axum::{Json, extract::State, http::StatusCode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use amork_core::types::money::validate_price;
use amork_core::{CategoryId, FoodId};

use crate::db::{CategoryRepository, FoodRepository};
use crate::db::foods::{FoodChanges, FoodFilter, NewFood};
use crate::error::{ApiJson, ApiPath, ApiQuery, AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::Food;
use crate::services::ServiceError;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;
const DEFAULT_POPULAR_LIMIT: i64 = 10;
const DEFAULT_COOKING_TIME: &str = "15 min";

/// Query parameters for `GET /api/foods`.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub category_id: Option<CategoryId>,
    pub search: Option<String>,
    #[serde(default)]
    pub include_unavailable: bool,
}

impl ListQuery {
    /// Page number (from 1) and page size after clamping.
    fn page_and_limit(&self) -> (i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        (page, limit)
    }
}

/// One page of foods.
#[derive(Debug, Serialize)]
pub struct FoodPage {
    pub foods: Vec<Food>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

/// Query parameters for `GET /api/foods/popular`.
#[derive(Debug, Default, Deserialize)]
pub struct PopularQuery {
    pub limit: Option<i64>,
}

/// Request body for `POST /api/foods`.
#[derive(Debug, Deserialize)]
pub struct CreateFoodRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub image_url: Option<String>,
    pub category_id: CategoryId,
    pub calories: Option<i32>,
    pub cooking_time: Option<String>,
    #[serde(default)]
    pub is_popular: bool,
    pub is_available: Option<bool>,
}

/// Request body for `PUT /api/foods/{id}`. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateFoodRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub original_price: Option<Decimal>,
    pub image_url: Option<String>,
    pub category_id: Option<CategoryId>,
    pub calories: Option<i32>,
    pub cooking_time: Option<String>,
    pub is_popular: Option<bool>,
    pub is_available: Option<bool>,
}

fn check_price(field: &str, price: Option<Decimal>) -> Result<()> {
    if let Some(price) = price {
        validate_price(price).map_err(|e| AppError::InvalidArgument(format!("{field}: {e}")))?;
    }
    Ok(())
}

fn check_calories(calories: Option<i32>) -> Result<()> {
    match calories {
        Some(c) if c < 0 => Err(AppError::InvalidArgument(
            "calories cannot be negative".to_string(),
        )),
        _ => Ok(()),
    }
}

/// GET /api/foods
pub async fn index(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<FoodPage>> {
    let (page, limit) = query.page_and_limit();
    let filter = FoodFilter {
        category_id: query.category_id,
        search: query.search.filter(|s| !s.trim().is_empty()),
        include_unavailable: query.include_unavailable,
        limit,
        offset: (page - 1).saturating_mul(limit),
    };

    let (foods, total) = FoodRepository::new(state.pool()).list(&filter).await?;
    Ok(Json(FoodPage {
        foods,
        total,
        page,
        limit,
    }))
}

/// GET /api/foods/popular
pub async fn popular(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PopularQuery>,
) -> Result<Json<Vec<Food>>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_POPULAR_LIMIT)
        .clamp(1, MAX_PAGE_SIZE);
    let foods = FoodRepository::new(state.pool()).popular(limit).await?;
    Ok(Json(foods))
}

/// GET /api/foods/{id}
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<FoodId>,
) -> Result<Json<Food>> {
    FoodRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("food not found".to_string()))
}

/// POST /api/foods
///
/// # Errors
///
/// `not_found` if the category does not exist.
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(body): ApiJson<CreateFoodRequest>,
) -> Result<(StatusCode, Json<Food>)> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidArgument("name is required".to_string()));
    }
    check_price("price", Some(body.price))?;
    check_price("original_price", body.original_price)?;
    check_calories(body.calories)?;

    let food = FoodRepository::new(state.pool())
        .create(&NewFood {
            name,
            description: body.description.as_deref(),
            price: body.price,
            original_price: body.original_price,
            image_url: body.image_url.as_deref().unwrap_or_default(),
            category_id: body.category_id,
            calories: body.calories.unwrap_or(0),
            cooking_time: body.cooking_time.as_deref().unwrap_or(DEFAULT_COOKING_TIME),
            is_popular: body.is_popular,
            is_available: body.is_available.unwrap_or(true),
        })
        .await
        .map_err(ServiceError::or_not_found("category"))?;

    tracing::info!(food_id = %food.id, "food created");
    Ok((StatusCode::CREATED, Json(food)))
}

/// PUT /api/foods/{id}
///
/// Price changes never touch existing order lines.
#[tracing::instrument(skip_all, fields(user_id = %user.id, food_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<FoodId>,
    ApiJson(body): ApiJson<UpdateFoodRequest>,
) -> Result<Json<Food>> {
    let name = body.name.as_deref().map(str::trim);
    if name == Some("") {
        return Err(AppError::InvalidArgument("name cannot be empty".to_string()));
    }
    check_price("price", body.price)?;
    check_price("original_price", body.original_price)?;
    check_calories(body.calories)?;

    if let Some(category_id) = body.category_id
        && CategoryRepository::new(state.pool())
            .get(category_id)
            .await?
            .is_none()
    {
        return Err(AppError::NotFound("category not found".to_string()));
    }

    let food = FoodRepository::new(state.pool())
        .update(
            id,
            &FoodChanges {
                name,
                description: body.description.as_deref(),
                price: body.price,
                original_price: body.original_price,
                image_url: body.image_url.as_deref(),
                category_id: body.category_id,
                calories: body.calories,
                cooking_time: body.cooking_time.as_deref(),
                is_popular: body.is_popular,
                is_available: body.is_available,
            },
        )
        .await
        .map_err(ServiceError::or_not_found("food"))?;
    Ok(Json(food))
}

/// DELETE /api/foods/{id}
#[tracing::instrument(skip_all, fields(user_id = %user.id, food_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<FoodId>,
) -> Result<StatusCode> {
    FoodRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(ServiceError::or_not_found("food"))?;

    tracing::info!("food deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_and_limit_defaults() {
        assert_eq!(ListQuery::default().page_and_limit(), (1, 20));
    }

    #[test]
    fn test_page_and_limit_clamped() {
        let query = ListQuery {
            page: Some(0),
            limit: Some(500),
            ..ListQuery::default()
        };
        assert_eq!(query.page_and_limit(), (1, 100));

        let query = ListQuery {
            page: Some(3),
            limit: Some(0),
            ..ListQuery::default()
        };
        assert_eq!(query.page_and_limit(), (3, 1));
    }
}
