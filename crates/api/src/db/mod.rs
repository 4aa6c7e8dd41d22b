//! Database operations for the Amork `PostgreSQL` schema.
//!
//! ## Tables
//!
//! - `users` - Customer accounts
//! - `categories`, `foods` - Menu catalog
//! - `cart_items` - One row per (user, food) pair
//! - `orders`, `order_items` - Placed orders and their frozen line snapshots
//! - `favorites`, `reviews` - Per-user food bookmarks and ratings
//! - `promotions` - Discount codes
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p amork-cli -- migrate
//! ```
//!
//! Repositories borrow the pool for plain reads and writes. Operations that
//! must share a transaction are exposed as associated functions taking a
//! `&mut PgConnection`.

pub mod cart;
pub mod categories;
pub mod favorites;
pub mod foods;
pub mod orders;
pub mod promotions;
pub mod reviews;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use cart::CartRepository;
pub use categories::CategoryRepository;
pub use favorites::FavoriteRepository;
pub use foods::FoodRepository;
pub use orders::OrderRepository;
pub use promotions::PromotionRepository;
pub use reviews::ReviewRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a unique violation to `Conflict`, keeping other errors as-is.
    pub(crate) fn from_unique(e: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return Self::Conflict(format!("{what} already exists"));
        }
        Self::Database(e)
    }

    /// Whether the error is a foreign key violation.
    pub(crate) fn is_foreign_key_violation(&self) -> bool {
        matches!(
            self,
            Self::Database(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation()
        )
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
