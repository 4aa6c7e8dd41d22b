//! Core types for Amork.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod money;
pub mod rating;
pub mod status;
pub mod tier;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::{MoneyError, round_money};
pub use rating::{Rating, RatingError, average_rating};
pub use status::*;
pub use tier::MemberTier;
