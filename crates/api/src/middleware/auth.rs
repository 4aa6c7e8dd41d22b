//! Bearer-token authentication extractor.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};

use crate::error::{AppError, set_sentry_user};
use crate::models::CurrentUser;
use crate::services::auth::{TokenError, TokenService};
use crate::state::AppState;

/// Extractor that requires a valid `Authorization: Bearer <token>` header.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when a request lacks a usable token.
#[derive(Debug)]
pub enum AuthRejection {
    /// No bearer token was sent.
    MissingToken,
    /// The token failed verification.
    InvalidToken(TokenError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let message = match self {
            Self::MissingToken => "missing bearer token".to_string(),
            Self::InvalidToken(err) => err.to_string(),
        };
        AppError::Unauthenticated(message).into_response()
    }
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(TokenService::extract_bearer)
            .ok_or(AuthRejection::MissingToken)?;

        let user = state.tokens().verify(token).map_err(|e| {
            tracing::debug!(error = %e, "rejected bearer token");
            AuthRejection::InvalidToken(e)
        })?;

        set_sentry_user(&user.id, Some(&user.email));
        Ok(Self(user))
    }
}
