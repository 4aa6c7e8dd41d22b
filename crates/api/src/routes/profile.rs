//! The caller's own profile.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use crate::error::{ApiJson, Result};
use crate::middleware::RequireAuth;
use crate::models::Profile;
use crate::services::ProfileService;
use crate::services::auth::AuthService;
use crate::services::profile::ProfileUpdate;
use crate::state::AppState;

/// Request body for `PUT /api/profile`. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub fullname: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub profile_image: Option<String>,
}

/// Request body for `PUT /api/profile/password`.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// GET /api/profile
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Profile>> {
    let profile = ProfileService::new(state.pool()).get(user.id).await?;
    Ok(Json(profile))
}

/// PUT /api/profile
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(body): ApiJson<UpdateProfileRequest>,
) -> Result<Json<Profile>> {
    let profile = ProfileService::new(state.pool())
        .update(
            user.id,
            &ProfileUpdate {
                fullname: body.fullname.as_deref(),
                email: body.email.as_deref(),
                phone: body.phone.as_deref(),
                profile_image: body.profile_image.as_deref(),
            },
        )
        .await?;
    Ok(Json(profile))
}

/// PUT /api/profile/password
///
/// # Errors
///
/// `unauthenticated` if the old password does not verify, `invalid_argument`
/// if the new one is too short.
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn change_password(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(body): ApiJson<ChangePasswordRequest>,
) -> Result<StatusCode> {
    AuthService::new(state.pool(), state.tokens())
        .change_password(user.id, &body.old_password, &body.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
