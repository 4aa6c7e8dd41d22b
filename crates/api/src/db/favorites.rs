//! Favorite repository.

use amork_core::{FavoriteId, FoodId, UserId};
use sqlx::PgPool;

use super::RepositoryError;
use crate::models::FavoriteFood;

/// Repository for per-user favorite foods.
pub struct FavoriteRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FavoriteRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The user's favorites joined with their foods, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<FavoriteFood>, RepositoryError> {
        let rows = sqlx::query_as::<_, FavoriteFood>(
            "SELECT fav.id AS favorite_id, fav.created_at AS favorited_at,
                    f.id, f.name, f.description, f.price, f.original_price, f.image_url,
                    f.category_id, f.calories, f.cooking_time, f.rating, f.is_popular,
                    f.is_available, f.created_at, f.updated_at
             FROM favorites fav
             JOIN foods f ON f.id = fav.food_id
             WHERE fav.user_id = $1
             ORDER BY fav.created_at DESC, fav.id",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Mark a food as favorite. Returns `false` if it already was.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the food does not exist.
    pub async fn add(&self, user_id: UserId, food_id: FoodId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO favorites (id, user_id, food_id)
             VALUES ($1, $2, $3)
             ON CONFLICT (user_id, food_id) DO NOTHING",
        )
        .bind(FavoriteId::generate())
        .bind(user_id)
        .bind(food_id)
        .execute(self.pool)
        .await
        .map_err(|e| {
            let err = RepositoryError::Database(e);
            if err.is_foreign_key_violation() {
                RepositoryError::NotFound
            } else {
                err
            }
        })?;

        Ok(result.rows_affected() == 1)
    }

    /// Remove a favorite by food.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the food was not a favorite.
    pub async fn remove(&self, user_id: UserId, food_id: FoodId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND food_id = $2")
            .bind(user_id)
            .bind(food_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Whether the food is one of the user's favorites.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn contains(&self, user_id: UserId, food_id: FoodId) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM favorites WHERE user_id = $1 AND food_id = $2)",
        )
        .bind(user_id)
        .bind(food_id)
        .fetch_one(self.pool)
        .await?;
        Ok(exists)
    }
}
