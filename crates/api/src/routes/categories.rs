//! Menu categories.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use amork_core::CategoryId;

use crate::db::categories::CategoryFields;
use crate::db::{CategoryRepository, FoodRepository, RepositoryError};
use crate::error::{ApiJson, ApiPath, AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{Category, Food};
use crate::services::ServiceError;
use crate::state::AppState;

/// Request body for creating or updating a category.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryRequest {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl CategoryRequest {
    fn fields(&self) -> CategoryFields<'_> {
        CategoryFields {
            name: self.name.as_deref().map(str::trim),
            icon: self.icon.as_deref(),
            color: self.color.as_deref(),
            description: self.description.as_deref(),
            image_url: self.image_url.as_deref(),
        }
    }
}

/// GET /api/categories
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = CategoryRepository::new(state.pool()).list().await?;
    Ok(Json(categories))
}

/// GET /api/categories/{id}
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CategoryId>,
) -> Result<Json<Category>> {
    CategoryRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("category not found".to_string()))
}

/// GET /api/categories/{id}/foods
pub async fn foods(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CategoryId>,
) -> Result<Json<Vec<Food>>> {
    if CategoryRepository::new(state.pool()).get(id).await?.is_none() {
        return Err(AppError::NotFound("category not found".to_string()));
    }
    let foods = FoodRepository::new(state.pool()).list_by_category(id).await?;
    Ok(Json(foods))
}

/// POST /api/categories
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(body): ApiJson<CategoryRequest>,
) -> Result<(StatusCode, Json<Category>)> {
    let fields = body.fields();
    let name = fields
        .name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::InvalidArgument("name is required".to_string()))?;

    let category = CategoryRepository::new(state.pool())
        .create(name, &fields)
        .await
        .map_err(ServiceError::or_not_found("category"))?;

    tracing::info!(category_id = %category.id, "category created");
    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/categories/{id}
#[tracing::instrument(skip_all, fields(user_id = %user.id, category_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<CategoryId>,
    ApiJson(body): ApiJson<CategoryRequest>,
) -> Result<Json<Category>> {
    let fields = body.fields();
    if fields.name == Some("") {
        return Err(AppError::InvalidArgument("name cannot be empty".to_string()));
    }

    let category = CategoryRepository::new(state.pool())
        .update(id, &fields)
        .await
        .map_err(ServiceError::or_not_found("category"))?;
    Ok(Json(category))
}

/// DELETE /api/categories/{id}
///
/// # Errors
///
/// `failed_precondition` while foods still belong to the category.
#[tracing::instrument(skip_all, fields(user_id = %user.id, category_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<CategoryId>,
) -> Result<StatusCode> {
    CategoryRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("category not found".to_string()),
            e if e.is_foreign_key_violation() => AppError::FailedPrecondition(
                "category still has foods; move or delete them first".to_string(),
            ),
            e => AppError::Database(e),
        })?;

    tracing::info!("category deleted");
    Ok(StatusCode::NO_CONTENT)
}
