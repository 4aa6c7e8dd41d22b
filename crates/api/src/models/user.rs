//! User domain models.

use amork_core::{Email, MemberTier, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A customer account. The password hash is never part of this type.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub fullname: String,
    pub email: Email,
    pub phone: Option<String>,
    pub member_tier: MemberTier,
    pub profile_image: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile response: the user plus their order history size.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    #[serde(flatten)]
    pub user: User,
    pub order_count: i64,
}

/// The authenticated caller, taken from a verified session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: String,
}
