//! Category repository.

use amork_core::CategoryId;
use sqlx::PgPool;

use super::RepositoryError;
use crate::models::Category;

const CATEGORY_COLUMNS: &str = "id, name, icon, color, description, image_url, created_at";

/// Fields of a category. On update, `None` leaves a column unchanged.
#[derive(Debug, Default)]
pub struct CategoryFields<'a> {
    pub name: Option<&'a str>,
    pub icon: Option<&'a str>,
    pub color: Option<&'a str>,
    pub description: Option<&'a str>,
    pub image_url: Option<&'a str>,
}

/// Repository for menu categories.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all categories by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY name"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Get a category by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Create a category named `name`; `fields.name` is ignored.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is taken.
    pub async fn create(
        &self,
        name: &str,
        fields: &CategoryFields<'_>,
    ) -> Result<Category, RepositoryError> {
        sqlx::query_as::<_, Category>(&format!(
            "INSERT INTO categories (id, name, icon, color, description, image_url)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(CategoryId::generate())
        .bind(name)
        .bind(fields.icon)
        .bind(fields.color)
        .bind(fields.description)
        .bind(fields.image_url)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "category"))
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist.
    /// Returns `RepositoryError::Conflict` if the new name is taken.
    pub async fn update(
        &self,
        id: CategoryId,
        fields: &CategoryFields<'_>,
    ) -> Result<Category, RepositoryError> {
        sqlx::query_as::<_, Category>(&format!(
            "UPDATE categories SET
                 name = COALESCE($2, name),
                 icon = COALESCE($3, icon),
                 color = COALESCE($4, color),
                 description = COALESCE($5, description),
                 image_url = COALESCE($6, image_url)
             WHERE id = $1
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(id)
        .bind(fields.name)
        .bind(fields.icon)
        .bind(fields.color)
        .bind(fields.description)
        .bind(fields.image_url)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "category"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if nothing was deleted.
    /// Returns `RepositoryError::Database` with a foreign key violation when
    /// foods still reference the category.
    pub async fn delete(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
