//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Errors render as the JSON
//! envelope `{"error": "<kind>", "message": "<text>"}`; server errors are
//! captured to Sentry before responding.

use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::ServiceError;
use crate::services::auth::{AuthError, TokenError};

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] RepositoryError),

    /// Entity absent or not owned by the caller.
    #[error("{0}")]
    NotFound(String),

    /// A unique value is already taken.
    #[error("{0}")]
    AlreadyExists(String),

    /// Missing or invalid credentials.
    #[error("{0}")]
    Unauthenticated(String),

    /// The current state forbids the request.
    #[error("{0}")]
    FailedPrecondition(String),

    /// The request is malformed.
    #[error("{0}")]
    InvalidArgument(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl AppError {
    /// Machine-readable error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::AlreadyExists(_) => "already_exists",
            Self::Unauthenticated(_) => "unauthenticated",
            Self::FailedPrecondition(_) => "failed_precondition",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::Database(_) | Self::Internal(_) => "internal",
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::AlreadyExists(_) => StatusCode::CONFLICT,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::FailedPrecondition(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Database(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        let body = ErrorBody {
            error: self.kind(),
            message,
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(what) => Self::NotFound(format!("{what} not found")),
            ServiceError::AlreadyExists(msg) => Self::AlreadyExists(msg),
            ServiceError::FailedPrecondition(msg) => Self::FailedPrecondition(msg),
            ServiceError::InvalidArgument(msg) => Self::InvalidArgument(msg),
            ServiceError::Repository(e) => Self::Database(e),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidEmail(e) => Self::InvalidArgument(format!("invalid email: {e}")),
            AuthError::WeakPassword(msg) | AuthError::MissingField(msg) => {
                Self::InvalidArgument(msg)
            }
            AuthError::InvalidCredentials => {
                Self::Unauthenticated("invalid email or password".to_string())
            }
            AuthError::AccountDisabled => Self::Unauthenticated(err.to_string()),
            AuthError::UserAlreadyExists => {
                Self::AlreadyExists("an account with this email already exists".to_string())
            }
            AuthError::Token(e) => e.into(),
            AuthError::Repository(e) => Self::Database(e),
            AuthError::PasswordHash => Self::Internal(err.to_string()),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::GenerationFailed(_) => Self::Internal(err.to_string()),
            TokenError::Expired | TokenError::InvalidSignature | TokenError::Invalid(_) => {
                Self::Unauthenticated(err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidArgument(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::InvalidArgument(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidArgument(rejection.body_text())
    }
}

/// `axum::Json` whose rejections use the error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

impl<T: Serialize> IntoResponse for ApiJson<T> {
    fn into_response(self) -> Response {
        Json(self.0).into_response()
    }
}

/// `axum::extract::Path` whose rejections use the error envelope.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// `axum::extract::Query` whose rejections use the error envelope.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the current request.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("food not found".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::AlreadyExists("taken".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Unauthenticated("no".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::FailedPrecondition("empty".to_string())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(AppError::InvalidArgument("bad".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("boom".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_envelope_shape() {
        let (status, body) =
            body_json(AppError::FailedPrecondition("cannot place an order with no items".into()))
                .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "failed_precondition");
        assert_eq!(body["message"], "cannot place an order with no items");
    }

    #[tokio::test]
    async fn test_internal_details_hidden() {
        let (_, body) = body_json(AppError::Internal("connection refused".into())).await;
        assert_eq!(body["error"], "internal");
        assert_eq!(body["message"], "Internal server error");
    }

    #[test]
    fn test_service_error_mapping() {
        let err: AppError = ServiceError::NotFound("order").into();
        assert!(matches!(&err, AppError::NotFound(m) if m == "order not found"));

        let err: AppError = ServiceError::AlreadyExists("promotion code already exists".into()).into();
        assert_eq!(err.kind(), "already_exists");

        let err: AppError = ServiceError::Repository(RepositoryError::NotFound).into();
        assert_eq!(err.kind(), "internal");
    }

    #[test]
    fn test_auth_error_mapping() {
        assert_eq!(AppError::from(AuthError::InvalidCredentials).kind(), "unauthenticated");
        assert_eq!(AppError::from(AuthError::UserAlreadyExists).kind(), "already_exists");
        assert_eq!(
            AppError::from(AuthError::WeakPassword("too short".into())).kind(),
            "invalid_argument"
        );
        assert_eq!(AppError::from(AuthError::PasswordHash).kind(), "internal");
        assert_eq!(
            AppError::from(AuthError::Token(TokenError::Expired)).kind(),
            "unauthenticated"
        );
        assert_eq!(
            AppError::from(TokenError::GenerationFailed("key".into())).kind(),
            "internal"
        );
    }
}
