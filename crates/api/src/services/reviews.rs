//! Reviews and the derived food rating.
//!
//! Every write locks the food row first, then changes the review, then
//! recomputes `foods.rating` from all current scores in the same transaction.

use amork_core::{FoodId, Rating, ReviewId, UserId, average_rating};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use super::ServiceError;
use crate::db::{FoodRepository, ReviewRepository};
use crate::models::{FoodReviews, ReviewEntry};

/// Review operations.
pub struct ReviewService<'a> {
    pool: &'a PgPool,
    reviews: ReviewRepository<'a>,
    foods: FoodRepository<'a>,
}

impl<'a> ReviewService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            reviews: ReviewRepository::new(pool),
            foods: FoodRepository::new(pool),
        }
    }

    /// Reviews of a food, newest first, with their mean.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the food does not exist.
    pub async fn list_for_food(&self, food_id: FoodId) -> Result<FoodReviews, ServiceError> {
        if !self.foods.exists(food_id).await? {
            return Err(ServiceError::NotFound("food"));
        }

        let reviews = self.reviews.list_for_food(food_id).await?;
        let scores: Vec<i16> = reviews.iter().map(|r| r.rating).collect();

        Ok(FoodReviews {
            food_id,
            average_rating: average_rating(&scores),
            review_count: reviews.len(),
            reviews,
        })
    }

    /// Create or overwrite the user's review of a food.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::InvalidArgument` if `rating` is outside 1..=5.
    /// Returns `ServiceError::NotFound` if the food does not exist.
    #[tracing::instrument(skip(self, comment))]
    pub async fn upsert(
        &self,
        user_id: UserId,
        food_id: FoodId,
        rating: i64,
        comment: Option<&str>,
    ) -> Result<ReviewEntry, ServiceError> {
        let rating = Rating::new(rating).map_err(|e| ServiceError::InvalidArgument(e.to_string()))?;
        let comment = comment.map(str::trim).filter(|c| !c.is_empty());

        let mut tx = self.pool.begin().await?;

        FoodRepository::lock(&mut tx, food_id)
            .await
            .map_err(ServiceError::or_not_found("food"))?;

        let id = ReviewRepository::upsert(&mut tx, user_id, food_id, rating, comment)
            .await
            .map_err(ServiceError::or_not_found("food"))?;

        let average = refresh_rating(&mut tx, food_id).await?;
        let entry = ReviewRepository::entry(&mut tx, id)
            .await
            .map_err(ServiceError::or_not_found("review"))?;

        tx.commit().await?;

        tracing::info!(review_id = %id, %average, "review saved");
        Ok(entry)
    }

    /// Delete one of the user's reviews.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the user has no such review.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, user_id: UserId, id: ReviewId) -> Result<(), ServiceError> {
        let mut tx = self.pool.begin().await?;

        let food_id = ReviewRepository::food_of_owned(&mut tx, user_id, id)
            .await
            .map_err(ServiceError::or_not_found("review"))?;

        FoodRepository::lock(&mut tx, food_id)
            .await
            .map_err(ServiceError::or_not_found("food"))?;

        ReviewRepository::delete_owned(&mut tx, user_id, id)
            .await
            .map_err(ServiceError::or_not_found("review"))?;

        let average = refresh_rating(&mut tx, food_id).await?;
        tx.commit().await?;

        tracing::info!(%food_id, %average, "review deleted");
        Ok(())
    }
}

/// Recompute and store the mean rating of a locked food.
async fn refresh_rating(conn: &mut PgConnection, food_id: FoodId) -> Result<Decimal, ServiceError> {
    let scores = ReviewRepository::ratings_for_food(&mut *conn, food_id).await?;
    let average = average_rating(&scores);
    FoodRepository::set_rating(&mut *conn, food_id, average)
        .await
        .map_err(ServiceError::or_not_found("food"))?;
    Ok(average)
}
