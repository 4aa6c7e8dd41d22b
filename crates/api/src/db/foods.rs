//! Food repository.

use amork_core::{CategoryId, FoodId};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use super::RepositoryError;
use crate::models::Food;

const FOOD_COLUMNS: &str = "id, name, description, price, original_price, image_url, category_id, \
                            calories, cooking_time, rating, is_popular, is_available, \
                            created_at, updated_at";

const LIST_FILTER: &str = "($1::uuid IS NULL OR category_id = $1)
     AND ($2::text IS NULL OR name ILIKE $2 OR description ILIKE $2)
     AND ($3 OR is_available)";

/// Filters for the food listing.
#[derive(Debug, Clone, Default)]
pub struct FoodFilter {
    pub category_id: Option<CategoryId>,
    pub search: Option<String>,
    pub include_unavailable: bool,
    pub limit: i64,
    pub offset: i64,
}

/// Fields for a new food.
#[derive(Debug)]
pub struct NewFood<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub image_url: &'a str,
    pub category_id: CategoryId,
    pub calories: i32,
    pub cooking_time: &'a str,
    pub is_popular: bool,
    pub is_available: bool,
}

/// Partial food update; `None` leaves a column unchanged.
#[derive(Debug, Default)]
pub struct FoodChanges<'a> {
    pub name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub price: Option<Decimal>,
    pub original_price: Option<Decimal>,
    pub image_url: Option<&'a str>,
    pub category_id: Option<CategoryId>,
    pub calories: Option<i32>,
    pub cooking_time: Option<&'a str>,
    pub is_popular: Option<bool>,
    pub is_available: Option<bool>,
}

/// Name and current price of a food, as snapshotted into order lines.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FoodPrice {
    pub id: FoodId,
    pub name: String,
    pub price: Decimal,
}

/// Repository for menu items.
pub struct FoodRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FoodRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List foods matching `filter`, ordered by name, with the total match count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &FoodFilter) -> Result<(Vec<Food>, i64), RepositoryError> {
        let pattern = filter.search.as_deref().map(like_pattern);

        let foods = sqlx::query_as::<_, Food>(&format!(
            "SELECT {FOOD_COLUMNS} FROM foods
             WHERE {LIST_FILTER}
             ORDER BY name, id
             LIMIT $4 OFFSET $5"
        ))
        .bind(filter.category_id)
        .bind(pattern.as_deref())
        .bind(filter.include_unavailable)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(self.pool)
        .await?;

        let total =
            sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM foods WHERE {LIST_FILTER}"))
                .bind(filter.category_id)
                .bind(pattern.as_deref())
                .bind(filter.include_unavailable)
                .fetch_one(self.pool)
                .await?;

        Ok((foods, total))
    }

    /// Available popular foods, best rated first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn popular(&self, limit: i64) -> Result<Vec<Food>, RepositoryError> {
        let foods = sqlx::query_as::<_, Food>(&format!(
            "SELECT {FOOD_COLUMNS} FROM foods
             WHERE is_popular AND is_available
             ORDER BY rating DESC, name
             LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(foods)
    }

    /// Available foods of one category, by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Food>, RepositoryError> {
        let foods = sqlx::query_as::<_, Food>(&format!(
            "SELECT {FOOD_COLUMNS} FROM foods
             WHERE category_id = $1 AND is_available
             ORDER BY name"
        ))
        .bind(category_id)
        .fetch_all(self.pool)
        .await?;
        Ok(foods)
    }

    /// Get a food by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: FoodId) -> Result<Option<Food>, RepositoryError> {
        let food = sqlx::query_as::<_, Food>(&format!(
            "SELECT {FOOD_COLUMNS} FROM foods WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(food)
    }

    /// Whether a food exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: FoodId) -> Result<bool, RepositoryError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM foods WHERE id = $1)")
                .bind(id)
                .fetch_one(self.pool)
                .await?;
        Ok(exists)
    }

    /// Create a food.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist.
    pub async fn create(&self, new: &NewFood<'_>) -> Result<Food, RepositoryError> {
        sqlx::query_as::<_, Food>(&format!(
            "INSERT INTO foods (id, name, description, price, original_price, image_url,
                                category_id, calories, cooking_time, is_popular, is_available)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {FOOD_COLUMNS}"
        ))
        .bind(FoodId::generate())
        .bind(new.name)
        .bind(new.description)
        .bind(new.price)
        .bind(new.original_price)
        .bind(new.image_url)
        .bind(new.category_id)
        .bind(new.calories)
        .bind(new.cooking_time)
        .bind(new.is_popular)
        .bind(new.is_available)
        .fetch_one(self.pool)
        .await
        .map_err(category_missing)
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the food or the new category
    /// does not exist.
    pub async fn update(
        &self,
        id: FoodId,
        changes: &FoodChanges<'_>,
    ) -> Result<Food, RepositoryError> {
        sqlx::query_as::<_, Food>(&format!(
            "UPDATE foods SET
                 name = COALESCE($2, name),
                 description = COALESCE($3, description),
                 price = COALESCE($4, price),
                 original_price = COALESCE($5, original_price),
                 image_url = COALESCE($6, image_url),
                 category_id = COALESCE($7, category_id),
                 calories = COALESCE($8, calories),
                 cooking_time = COALESCE($9, cooking_time),
                 is_popular = COALESCE($10, is_popular),
                 is_available = COALESCE($11, is_available),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {FOOD_COLUMNS}"
        ))
        .bind(id)
        .bind(changes.name)
        .bind(changes.description)
        .bind(changes.price)
        .bind(changes.original_price)
        .bind(changes.image_url)
        .bind(changes.category_id)
        .bind(changes.calories)
        .bind(changes.cooking_time)
        .bind(changes.is_popular)
        .bind(changes.is_available)
        .fetch_optional(self.pool)
        .await
        .map_err(category_missing)?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a food. Cart rows, favorites and reviews go with it; order
    /// lines keep their snapshot with `food_id` cleared.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if nothing was deleted.
    pub async fn delete(&self, id: FoodId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM foods WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Name and price of the given foods, inside a transaction.
    ///
    /// Unknown IDs are simply absent from the result.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn prices_in(
        conn: &mut PgConnection,
        ids: &[FoodId],
    ) -> Result<Vec<FoodPrice>, RepositoryError> {
        let rows = sqlx::query_as::<_, FoodPrice>(
            "SELECT id, name, price FROM foods WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(conn)
        .await?;
        Ok(rows)
    }

    /// Lock a food row for the rest of the transaction.
    ///
    /// Rating writers take this lock first so that concurrent reviews of the
    /// same food recompute the mean one after another.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the food does not exist.
    pub async fn lock(conn: &mut PgConnection, id: FoodId) -> Result<(), RepositoryError> {
        sqlx::query_scalar::<_, FoodId>("SELECT id FROM foods WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await?
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    /// Overwrite the derived rating of a food.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the food does not exist.
    pub async fn set_rating(
        conn: &mut PgConnection,
        id: FoodId,
        rating: Decimal,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE foods SET rating = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(rating)
            .execute(conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

/// Build an `ILIKE` substring pattern, escaping wildcard characters.
fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn category_missing(e: sqlx::Error) -> RepositoryError {
    let err = RepositoryError::Database(e);
    if err.is_foreign_key_violation() {
        RepositoryError::NotFound
    } else {
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_wraps_and_escapes() {
        assert_eq!(like_pattern("burger"), "%burger%");
        assert_eq!(like_pattern("  50%_off "), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
