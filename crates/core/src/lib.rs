//! Amork Core - Shared domain types and rules.
//!
//! This crate provides the types and pure business rules used by the Amork
//! components:
//! - `api` - The food-ordering HTTP API
//! - `cli` - Command-line tools for migrations, seeding and promotions
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Everything that decides a number (cart totals, order
//! totals, rating averages, promotion discounts) or a state (order status,
//! member tier) lives here so it can be tested without a database.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, emails, money, statuses and tiers
//! - [`pricing`] - Line, cart and order total computation
//! - [`promotion`] - Promotion validity and discount quotes
//! - [`order_number`] - Human-readable order number format

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod order_number;
pub mod pricing;
pub mod promotion;
pub mod types;

pub use pricing::{MAX_LINE_QUANTITY, OrderTotals, PricedLine, cart_total, check_quantity};
pub use promotion::{PromotionError, PromotionQuote, PromotionTerms};
pub use types::*;
