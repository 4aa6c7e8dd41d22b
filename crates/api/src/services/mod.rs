//! Business logic between routes and repositories.
//!
//! Services own validation and multi-step workflows (transactions, derived
//! values). Pure arithmetic and state rules live in `amork_core`.

pub mod auth;
pub mod cart;
pub mod orders;
pub mod profile;
pub mod promotions;
pub mod reviews;

use amork_core::MoneyError;
use amork_core::pricing::QuantityOutOfRange;
use thiserror::Error;

use crate::db::RepositoryError;

pub use cart::CartService;
pub use orders::OrderService;
pub use profile::ProfileService;
pub use promotions::PromotionService;
pub use reviews::ReviewService;

/// Errors raised by services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The entity does not exist or is not visible to the caller.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A unique value is already taken.
    #[error("{0}")]
    AlreadyExists(String),

    /// The request is well-formed but the current state forbids it.
    #[error("{0}")]
    FailedPrecondition(String),

    /// The request itself is malformed.
    #[error("{0}")]
    InvalidArgument(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl ServiceError {
    /// Map `RepositoryError::NotFound` to a named `NotFound`.
    pub(crate) fn or_not_found(what: &'static str) -> impl Fn(RepositoryError) -> Self {
        move |e| match e {
            RepositoryError::NotFound => Self::NotFound(what),
            RepositoryError::Conflict(msg) => Self::AlreadyExists(msg),
            other => Self::Repository(other),
        }
    }

    /// Map `RepositoryError::Conflict` to `AlreadyExists`, for inserts that
    /// cannot miss a row.
    pub(crate) fn from_conflict(e: RepositoryError) -> Self {
        match e {
            RepositoryError::Conflict(msg) => Self::AlreadyExists(msg),
            other => Self::Repository(other),
        }
    }
}

impl From<MoneyError> for ServiceError {
    fn from(e: MoneyError) -> Self {
        Self::InvalidArgument(e.to_string())
    }
}

impl From<QuantityOutOfRange> for ServiceError {
    fn from(e: QuantityOutOfRange) -> Self {
        Self::InvalidArgument(e.to_string())
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_conflict_keeps_other_errors() {
        let err = ServiceError::from_conflict(RepositoryError::Conflict("order number taken".into()));
        assert!(matches!(err, ServiceError::AlreadyExists(msg) if msg == "order number taken"));

        let err = ServiceError::from_conflict(RepositoryError::NotFound);
        assert!(matches!(err, ServiceError::Repository(RepositoryError::NotFound)));
    }

    #[test]
    fn test_out_of_range_values_are_invalid_arguments() {
        assert!(matches!(
            ServiceError::from(MoneyError::Overflow),
            ServiceError::InvalidArgument(_)
        ));
        assert!(matches!(
            ServiceError::from(QuantityOutOfRange(0)),
            ServiceError::InvalidArgument(_)
        ));
    }
}
