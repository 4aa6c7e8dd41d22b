//! Cart repository.
//!
//! A user's cart holds at most one row per food; adding the same food again
//! increments that row in place.

use amork_core::{CartItemId, FoodId, UserId};
use sqlx::{PgConnection, PgPool};

use super::RepositoryError;
use crate::models::CartLine;

const CART_LINE_SELECT: &str = "SELECT ci.id, ci.food_id, f.name AS food_name, f.price, \
                                f.image_url, f.calories, f.cooking_time, ci.quantity, \
                                ci.special_instructions, ci.created_at, ci.updated_at
                                FROM cart_items ci
                                JOIN foods f ON f.id = ci.food_id";

/// Repository for cart rows.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All lines of a user's cart, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lines(&self, user_id: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        let lines = sqlx::query_as::<_, CartLine>(&format!(
            "{CART_LINE_SELECT} WHERE ci.user_id = $1 ORDER BY ci.created_at, ci.id"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(lines)
    }

    /// Add `quantity` of a food, merging with an existing row.
    ///
    /// The merged quantity is capped at `max_quantity`. Instructions replace
    /// the stored ones only when supplied. Returns the ID of the (possibly
    /// pre-existing) row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the food does not exist.
    pub async fn add(
        &self,
        user_id: UserId,
        food_id: FoodId,
        quantity: i32,
        special_instructions: Option<&str>,
        max_quantity: i32,
    ) -> Result<CartItemId, RepositoryError> {
        sqlx::query_scalar::<_, CartItemId>(
            "INSERT INTO cart_items (id, user_id, food_id, quantity, special_instructions)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (user_id, food_id) DO UPDATE SET
                 quantity = LEAST(cart_items.quantity::BIGINT + EXCLUDED.quantity, $6)::INTEGER,
                 special_instructions = COALESCE(EXCLUDED.special_instructions,
                                                 cart_items.special_instructions),
                 updated_at = NOW()
             RETURNING id",
        )
        .bind(CartItemId::generate())
        .bind(user_id)
        .bind(food_id)
        .bind(quantity)
        .bind(special_instructions)
        .bind(max_quantity)
        .fetch_one(self.pool)
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

    /// One line of the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn line(
        &self,
        user_id: UserId,
        id: CartItemId,
    ) -> Result<Option<CartLine>, RepositoryError> {
        let line = sqlx::query_as::<_, CartLine>(&format!(
            "{CART_LINE_SELECT} WHERE ci.user_id = $1 AND ci.id = $2"
        ))
        .bind(user_id)
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(line)
    }

    /// Overwrite the quantity of a line owned by the user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no such line.
    pub async fn set_quantity(
        &self,
        user_id: UserId,
        id: CartItemId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE cart_items SET quantity = $3, updated_at = NOW()
             WHERE user_id = $1 AND id = $2",
        )
        .bind(user_id)
        .bind(id)
        .bind(quantity)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Remove a line owned by the user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if nothing was deleted.
    pub async fn remove(&self, user_id: UserId, id: CartItemId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND id = $2")
            .bind(user_id)
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Empty the user's cart, returning how many rows were removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Read and lock the user's cart lines inside a transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lock_lines(
        conn: &mut PgConnection,
        user_id: UserId,
    ) -> Result<Vec<CartLine>, RepositoryError> {
        let lines = sqlx::query_as::<_, CartLine>(&format!(
            "{CART_LINE_SELECT} WHERE ci.user_id = $1
             ORDER BY ci.created_at, ci.id
             FOR UPDATE OF ci"
        ))
        .bind(user_id)
        .fetch_all(conn)
        .await?;
        Ok(lines)
    }

    /// Delete specific lines of the user's cart inside a transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_lines(
        conn: &mut PgConnection,
        user_id: UserId,
        ids: &[CartItemId],
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND id = ANY($2)")
            .bind(user_id)
            .bind(ids)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }
}
