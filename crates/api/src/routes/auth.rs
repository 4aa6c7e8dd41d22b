//! Registration and login.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use amork_core::UserId;

use crate::error::{ApiJson, Result};
use crate::models::User;
use crate::services::auth::{AuthService, IssuedToken, Registration};
use crate::state::AppState;

/// Request body for `POST /api/auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub fullname: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

/// Request body for `POST /api/auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response for a successful registration or login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user_id: UserId,
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: User,
}

impl AuthResponse {
    fn new(user: User, issued: IssuedToken) -> Self {
        Self {
            user_id: user.id,
            token: issued.token,
            token_type: "Bearer",
            expires_in: issued.expires_in,
            user,
        }
    }
}

/// Create an account.
///
/// POST /api/auth/register
///
/// # Errors
///
/// `already_exists` for a taken email (any letter casing), `invalid_argument`
/// for a malformed email, a short password or an empty name.
#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let auth = AuthService::new(state.pool(), state.tokens());
    let (user, issued) = auth
        .register(&Registration {
            fullname: &body.fullname,
            email: &body.email,
            password: &body.password,
            phone: body.phone.as_deref(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(AuthResponse::new(user, issued))))
}

/// Exchange email and password for a token.
///
/// POST /api/auth/login
///
/// # Errors
///
/// `unauthenticated` for an unknown email or a wrong password.
#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let auth = AuthService::new(state.pool(), state.tokens());
    let (user, issued) = auth.login(&body.email, &body.password).await?;
    Ok(Json(AuthResponse::new(user, issued)))
}
