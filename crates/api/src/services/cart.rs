//! Cart service.

use amork_core::{CartItemId, FoodId, MAX_LINE_QUANTITY, UserId, check_quantity};
use sqlx::PgPool;

use super::ServiceError;
use crate::db::{CartRepository, FoodRepository};
use crate::models::{CartLine, CartView};

/// Cart operations for one user at a time.
pub struct CartService<'a> {
    cart: CartRepository<'a>,
    foods: FoodRepository<'a>,
}

impl<'a> CartService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            cart: CartRepository::new(pool),
            foods: FoodRepository::new(pool),
        }
    }

    /// The user's cart with live prices and totals.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the query fails.
    pub async fn get(&self, user_id: UserId) -> Result<CartView, ServiceError> {
        let lines = self.cart.lines(user_id).await?;
        Ok(CartView::from_lines(lines)?)
    }

    /// Add a food, merging with an existing line for the same food.
    ///
    /// Quantities below 1 count as 1. A merged line holds at most
    /// [`MAX_LINE_QUANTITY`] units.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the food does not exist.
    /// Returns `ServiceError::InvalidArgument` above [`MAX_LINE_QUANTITY`].
    #[tracing::instrument(skip(self, special_instructions))]
    pub async fn add_item(
        &self,
        user_id: UserId,
        food_id: FoodId,
        quantity: i32,
        special_instructions: Option<&str>,
    ) -> Result<CartLine, ServiceError> {
        let quantity = check_quantity(quantity.max(1))?;
        if !self.foods.exists(food_id).await? {
            return Err(ServiceError::NotFound("food"));
        }

        let instructions = special_instructions
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let id = self
            .cart
            .add(user_id, food_id, quantity, instructions, MAX_LINE_QUANTITY)
            .await
            .map_err(ServiceError::or_not_found("food"))?;

        self.cart
            .line(user_id, id)
            .await?
            .ok_or(ServiceError::NotFound("cart item"))
    }

    /// Overwrite the quantity of a line.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::InvalidArgument` outside `1..=MAX_LINE_QUANTITY`.
    /// Returns `ServiceError::NotFound` if the user has no such line.
    #[tracing::instrument(skip(self))]
    pub async fn update_quantity(
        &self,
        user_id: UserId,
        id: CartItemId,
        quantity: i32,
    ) -> Result<CartLine, ServiceError> {
        check_quantity(quantity)?;
        self.cart
            .set_quantity(user_id, id, quantity)
            .await
            .map_err(ServiceError::or_not_found("cart item"))?;

        self.cart
            .line(user_id, id)
            .await?
            .ok_or(ServiceError::NotFound("cart item"))
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the user has no such line.
    #[tracing::instrument(skip(self))]
    pub async fn remove_item(&self, user_id: UserId, id: CartItemId) -> Result<(), ServiceError> {
        self.cart
            .remove(user_id, id)
            .await
            .map_err(ServiceError::or_not_found("cart item"))
    }

    /// Empty the cart, returning how many lines were removed.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the query fails.
    #[tracing::instrument(skip(self))]
    pub async fn clear(&self, user_id: UserId) -> Result<u64, ServiceError> {
        Ok(self.cart.clear(user_id).await?)
    }
}
