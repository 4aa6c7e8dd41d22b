//! Rows read from the database and the JSON shapes built from them.

pub mod cart;
pub mod catalog;
pub mod favorite;
pub mod order;
pub mod promotion;
pub mod review;
pub mod user;

pub use cart::{CartLine, CartView};
pub use catalog::{Category, Food};
pub use favorite::FavoriteFood;
pub use order::{Order, OrderDetail, OrderItem};
pub use promotion::Promotion;
pub use review::{FoodReviews, ReviewEntry};
pub use user::{CurrentUser, Profile, User};
