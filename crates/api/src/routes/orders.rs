//! Order placement and history.

use axum::{Json, extract::State, http::StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;

use amork_core::{FoodId, OrderId, OrderStatus, PaymentMethod};

use crate::error::{ApiJson, ApiPath, AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{Order, OrderDetail};
use crate::services::OrderService;
use crate::services::orders::{OrderLineInput, PlaceOrder};
use crate::state::AppState;

/// An explicit order line in a place-order request.
#[derive(Debug, Deserialize)]
pub struct OrderLineRequest {
    pub food_id: FoodId,
    pub food_name: Option<String>,
    pub quantity: i32,
    pub unit_price: Option<Decimal>,
    pub special_instructions: Option<String>,
}

/// Request body for `POST /api/orders`.
///
/// Without `items` the caller's cart is checked out.
#[derive(Debug, Default, Deserialize)]
pub struct PlaceOrderRequest {
    pub items: Option<Vec<OrderLineRequest>>,
    pub delivery_street: Option<String>,
    pub delivery_city: Option<String>,
    pub delivery_phone: Option<String>,
    pub note: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub promo_code: Option<String>,
}

impl From<PlaceOrderRequest> for PlaceOrder {
    fn from(req: PlaceOrderRequest) -> Self {
        Self {
            items: req.items.map(|items| {
                items
                    .into_iter()
                    .map(|line| OrderLineInput {
                        food_id: line.food_id,
                        food_name: line.food_name,
                        quantity: line.quantity,
                        unit_price: line.unit_price,
                        special_instructions: line.special_instructions,
                    })
                    .collect()
            }),
            delivery_street: req.delivery_street,
            delivery_city: req.delivery_city,
            delivery_phone: req.delivery_phone,
            note: req.note,
            payment_method: req.payment_method,
            promo_code: req.promo_code,
        }
    }
}

/// Request body for `PUT /api/orders/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// GET /api/orders
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderService::new(state.pool(), state.pricing())
        .list(user.id)
        .await?;
    Ok(Json(orders))
}

/// POST /api/orders
///
/// # Errors
///
/// `failed_precondition` for an empty cart or an unusable promo code.
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn place(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(body): ApiJson<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<OrderDetail>)> {
    let order = OrderService::new(state.pool(), state.pricing())
        .place(user.id, body.into())
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/orders/{id}
#[tracing::instrument(skip_all, fields(user_id = %user.id, order_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<OrderId>,
) -> Result<Json<OrderDetail>> {
    let order = OrderService::new(state.pool(), state.pricing())
        .get(user.id, id)
        .await?;
    Ok(Json(order))
}

/// PUT /api/orders/{id}/status
#[tracing::instrument(skip_all, fields(user_id = %user.id, order_id = %id))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<OrderId>,
    ApiJson(body): ApiJson<UpdateStatusRequest>,
) -> Result<Json<Order>> {
    let status: OrderStatus = body.status.parse().map_err(AppError::InvalidArgument)?;
    let order = OrderService::new(state.pool(), state.pricing())
        .update_status(user.id, id, status)
        .await?;
    Ok(Json(order))
}

/// POST /api/orders/{id}/cancel
#[tracing::instrument(skip_all, fields(user_id = %user.id, order_id = %id))]
pub async fn cancel(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<OrderId>,
) -> Result<Json<Order>> {
    let order = OrderService::new(state.pool(), state.pricing())
        .cancel(user.id, id)
        .await?;
    Ok(Json(order))
}
