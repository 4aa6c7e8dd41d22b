//! Review repository.

use amork_core::{FoodId, Rating, ReviewId, UserId};
use sqlx::{PgConnection, PgPool};

use super::RepositoryError;
use crate::models::ReviewEntry;

const REVIEW_ENTRY_SELECT: &str = "SELECT r.id, r.user_id, r.food_id, r.rating, r.comment, \
                                   u.fullname AS reviewer_name, r.created_at
                                   FROM reviews r
                                   JOIN users u ON u.id = r.user_id";

/// Repository for food reviews.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Reviews of a food, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_food(&self, food_id: FoodId) -> Result<Vec<ReviewEntry>, RepositoryError> {
        let rows = sqlx::query_as::<_, ReviewEntry>(&format!(
            "{REVIEW_ENTRY_SELECT} WHERE r.food_id = $1 ORDER BY r.created_at DESC, r.id"
        ))
        .bind(food_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Insert or overwrite the user's review of a food inside a transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the food does not exist.
    pub async fn upsert(
        conn: &mut PgConnection,
        user_id: UserId,
        food_id: FoodId,
        rating: Rating,
        comment: Option<&str>,
    ) -> Result<ReviewId, RepositoryError> {
        sqlx::query_scalar::<_, ReviewId>(
            "INSERT INTO reviews (id, user_id, food_id, rating, comment)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (user_id, food_id) DO UPDATE SET
                 rating = EXCLUDED.rating,
                 comment = EXCLUDED.comment,
                 created_at = NOW()
             RETURNING id",
        )
        .bind(ReviewId::generate())
        .bind(user_id)
        .bind(food_id)
        .bind(rating.get())
        .bind(comment)
        .fetch_one(conn)
        .await
        .map_err(|e| {
            let err = RepositoryError::Database(e);
            if err.is_foreign_key_violation() {
                RepositoryError::NotFound
            } else {
                err
            }
        })
    }

    /// Fetch a single entry inside a transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review does not exist.
    pub async fn entry(
        conn: &mut PgConnection,
        id: ReviewId,
    ) -> Result<ReviewEntry, RepositoryError> {
        sqlx::query_as::<_, ReviewEntry>(&format!("{REVIEW_ENTRY_SELECT} WHERE r.id = $1"))
            .bind(id)
            .fetch_optional(conn)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// The food a review owned by the user belongs to.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no such review.
    pub async fn food_of_owned(
        conn: &mut PgConnection,
        user_id: UserId,
        id: ReviewId,
    ) -> Result<FoodId, RepositoryError> {
        sqlx::query_scalar::<_, FoodId>(
            "SELECT food_id FROM reviews WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(conn)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a review owned by the user, returning its food.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no such review.
    pub async fn delete_owned(
        conn: &mut PgConnection,
        user_id: UserId,
        id: ReviewId,
    ) -> Result<FoodId, RepositoryError> {
        sqlx::query_scalar::<_, FoodId>(
            "DELETE FROM reviews WHERE id = $1 AND user_id = $2 RETURNING food_id",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(conn)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// All current ratings of a food.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn ratings_for_food(
        conn: &mut PgConnection,
        food_id: FoodId,
    ) -> Result<Vec<i16>, RepositoryError> {
        let ratings =
            sqlx::query_scalar::<_, i16>("SELECT rating FROM reviews WHERE food_id = $1")
                .bind(food_id)
                .fetch_all(conn)
                .await?;
        Ok(ratings)
    }
}
