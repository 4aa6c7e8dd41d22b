//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness
//! GET  /health/ready                    - Readiness (database ping)
//!
//! # Auth (rate limited)
//! POST /api/auth/register               - Create account, returns token
//! POST /api/auth/login                  - Email + password, returns token
//!
//! # Profile (requires auth)
//! GET  /api/profile                     - Profile with tier and order count
//! PUT  /api/profile                     - Partial update
//! PUT  /api/profile/password            - Change password
//!
//! # Catalog (mutations require auth)
//! GET|POST        /api/categories
//! GET|PUT|DELETE  /api/categories/{id}
//! GET             /api/categories/{id}/foods
//! GET|POST        /api/foods
//! GET             /api/foods/popular
//! GET|PUT|DELETE  /api/foods/{id}
//!
//! # Cart (requires auth)
//! GET|DELETE      /api/cart
//! POST            /api/cart/items
//! PUT|DELETE      /api/cart/items/{id}
//!
//! # Orders (requires auth)
//! GET|POST        /api/orders
//! GET             /api/orders/{id}
//! PUT             /api/orders/{id}/status
//! POST            /api/orders/{id}/cancel
//!
//! # Favorites (requires auth)
//! GET|POST        /api/favorites
//! DELETE          /api/favorites/{food_id}
//! GET             /api/favorites/{food_id}/check
//!
//! # Reviews
//! GET             /api/reviews/food/{food_id}
//! POST            /api/reviews               (auth)
//! DELETE          /api/reviews/{id}          (auth, owner)
//!
//! # Promotions
//! GET             /api/promotions/active
//! POST            /api/promotions/validate
//! POST            /api/promotions            (auth)
//! ```

pub mod auth;
pub mod cart;
pub mod categories;
pub mod favorites;
pub mod foods;
pub mod orders;
pub mod profile;
pub mod promotions;
pub mod reviews;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes(trust_proxy: bool) -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .layer(auth_rate_limiter(trust_proxy))
}

/// Create the profile routes router.
pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(profile::show).put(profile::update))
        .route("/password", put(profile::change_password))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index).post(categories::create))
        .route(
            "/{id}",
            get(categories::show)
                .put(categories::update)
                .delete(categories::delete),
        )
        .route("/{id}/foods", get(categories::foods))
}

/// Create the food routes router.
pub fn food_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(foods::index).post(foods::create))
        .route("/popular", get(foods::popular))
        .route(
            "/{id}",
            get(foods::show).put(foods::update).delete(foods::delete),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add_item))
        .route(
            "/items/{id}",
            put(cart::update_item).delete(cart::remove_item),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index).post(orders::place))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", put(orders::update_status))
        .route("/{id}/cancel", post(orders::cancel))
}

/// Create the favorite routes router.
pub fn favorite_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(favorites::index).post(favorites::add))
        .route("/{food_id}", delete(favorites::remove))
        .route("/{food_id}/check", get(favorites::check))
}

/// Create the review routes router.
pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(reviews::upsert))
        .route("/food/{food_id}", get(reviews::for_food))
        .route("/{id}", delete(reviews::delete))
}

/// Create the promotion routes router.
pub fn promotion_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(promotions::create))
        .route("/active", get(promotions::active))
        .route("/validate", post(promotions::validate))
}

/// Create all `/api` routes.
///
/// `trust_proxy` lets the auth rate limiter key on forwarded client IPs.
pub fn routes(trust_proxy: bool) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes(trust_proxy))
        .nest("/profile", profile_routes())
        .nest("/categories", category_routes())
        .nest("/foods", food_routes())
        .nest("/cart", cart_routes())
        .nest("/orders", order_routes())
        .nest("/favorites", favorite_routes())
        .nest("/reviews", review_routes())
        .nest("/promotions", promotion_routes())
}
