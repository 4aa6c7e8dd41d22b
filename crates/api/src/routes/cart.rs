//! The caller's cart.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use amork_core::{CartItemId, FoodId};

use crate::error::{ApiJson, ApiPath, Result};
use crate::middleware::RequireAuth;
use crate::models::{CartLine, CartView};
use crate::services::CartService;
use crate::state::AppState;

/// Request body for `POST /api/cart/items`.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub food_id: FoodId,
    pub quantity: Option<i32>,
    pub special_instructions: Option<String>,
}

/// Request body for `PUT /api/cart/items/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i32,
}

/// Response for `DELETE /api/cart`.
#[derive(Debug, Serialize)]
pub struct ClearedCart {
    pub removed: u64,
}

/// GET /api/cart
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<CartView>> {
    let cart = CartService::new(state.pool()).get(user.id).await?;
    Ok(Json(cart))
}

/// POST /api/cart/items
///
/// Adding a food already in the cart increases its quantity.
#[tracing::instrument(skip_all, fields(user_id = %user.id, food_id = %body.food_id))]
pub async fn add_item(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(body): ApiJson<AddItemRequest>,
) -> Result<(StatusCode, Json<CartLine>)> {
    let line = CartService::new(state.pool())
        .add_item(
            user.id,
            body.food_id,
            body.quantity.unwrap_or(1),
            body.special_instructions.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(line)))
}

/// PUT /api/cart/items/{id}
#[tracing::instrument(skip_all, fields(user_id = %user.id, cart_item_id = %id))]
pub async fn update_item(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<CartItemId>,
    ApiJson(body): ApiJson<UpdateQuantityRequest>,
) -> Result<Json<CartLine>> {
    let line = CartService::new(state.pool())
        .update_quantity(user.id, id, body.quantity)
        .await?;
    Ok(Json(line))
}

/// DELETE /api/cart/items/{id}
#[tracing::instrument(skip_all, fields(user_id = %user.id, cart_item_id = %id))]
pub async fn remove_item(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<CartItemId>,
) -> Result<StatusCode> {
    CartService::new(state.pool()).remove_item(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/cart
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn clear(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<ClearedCart>> {
    let removed = CartService::new(state.pool()).clear(user.id).await?;
    Ok(Json(ClearedCart { removed }))
}
