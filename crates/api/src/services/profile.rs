//! Profile service.

use amork_core::{Email, MemberTier, UserId};
use sqlx::PgPool;

use super::ServiceError;
use crate::db::users::{ProfileChanges, UserRepository};
use crate::models::Profile;

/// Partial profile update as received from a client.
#[derive(Debug, Default)]
pub struct ProfileUpdate<'a> {
    pub fullname: Option<&'a str>,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub profile_image: Option<&'a str>,
}

/// Profile reads and updates.
pub struct ProfileService<'a> {
    users: UserRepository<'a>,
}

impl<'a> ProfileService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// The user's profile with order count and a freshly derived tier.
    ///
    /// A stored tier that no longer matches the order count is rewritten.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the user does not exist.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, user_id: UserId) -> Result<Profile, ServiceError> {
        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or(ServiceError::NotFound("user"))?;

        let order_count = self.users.count_orders(user_id).await?;
        let tier = MemberTier::from_order_count(order_count);

        let user = if tier == user.member_tier {
            user
        } else {
            tracing::info!(from = %user.member_tier, to = %tier, "member tier changed");
            self.users
                .set_member_tier(user_id, tier)
                .await
                .map_err(ServiceError::or_not_found("user"))?
        };

        Ok(Profile { user, order_count })
    }

    /// Apply a partial update and return the refreshed profile.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::InvalidArgument` for a malformed email or an
    /// empty name.
    /// Returns `ServiceError::AlreadyExists` if the email belongs to another
    /// account.
    #[tracing::instrument(skip_all, fields(%user_id))]
    pub async fn update(
        &self,
        user_id: UserId,
        update: &ProfileUpdate<'_>,
    ) -> Result<Profile, ServiceError> {
        let fullname = match update.fullname.map(str::trim) {
            Some("") => {
                return Err(ServiceError::InvalidArgument(
                    "fullname cannot be empty".to_string(),
                ));
            }
            other => other,
        };

        let email = update
            .email
            .map(Email::parse)
            .transpose()
            .map_err(|e| ServiceError::InvalidArgument(e.to_string()))?;

        self.users
            .update_profile(
                user_id,
                &ProfileChanges {
                    fullname,
                    email: email.as_ref(),
                    phone: update.phone.map(str::trim),
                    profile_image: update.profile_image.map(str::trim),
                },
            )
            .await
            .map_err(ServiceError::or_not_found("user"))?;

        self.get(user_id).await
    }
}
