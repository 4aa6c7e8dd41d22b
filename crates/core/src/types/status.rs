//! Status enums for orders and payments.
//!
//! The order lifecycle is a small state machine driven only by explicit
//! status updates:
//!
//! ```text
//! pending -> confirmed -> preparing -> delivering -> completed
//!    \           \            \
//!     +-----------+------------+--> cancelled
//! ```
//!
//! New orders start at `confirmed`; `pending` exists for rows created before
//! mock payment confirmed orders immediately.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Delivering,
    Completed,
    Cancelled,
}

/// A status change the state machine does not allow.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("cannot change order status from {from} to {to}")]
pub struct StatusTransitionError {
    /// Current status.
    pub from: OrderStatus,
    /// Requested status.
    pub to: OrderStatus,
}

impl OrderStatus {
    /// Status assigned to freshly placed orders.
    pub const INITIAL: Self = Self::Confirmed;

    /// The next status along the happy path, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Confirmed),
            Self::Confirmed => Some(Self::Preparing),
            Self::Preparing => Some(Self::Delivering),
            Self::Delivering => Some(Self::Completed),
            Self::Completed | Self::Cancelled => None,
        }
    }

    /// Whether no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether the order can still be cancelled.
    ///
    /// Once food is out for delivery the order can no longer be cancelled.
    #[must_use]
    pub const fn is_cancellable(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed | Self::Preparing)
    }

    /// Validate a transition to `to`.
    ///
    /// Allowed moves are exactly one step forward, or cancellation while
    /// [`is_cancellable`](Self::is_cancellable).
    ///
    /// # Errors
    ///
    /// Returns `StatusTransitionError` for every other move, including
    /// "changing" to the current status.
    pub fn transition_to(self, to: Self) -> Result<Self, StatusTransitionError> {
        let allowed = match to {
            Self::Cancelled => self.is_cancellable(),
            _ => self.next() == Some(to),
        };
        if allowed {
            Ok(to)
        } else {
            Err(StatusTransitionError { from: self, to })
        }
    }

    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Preparing => "preparing",
            Self::Delivering => "delivering",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "preparing" => Ok(Self::Preparing),
            "delivering" => Ok(Self::Delivering),
            "completed" => Ok(Self::Completed),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            other => Err(format!("invalid order status: {other}")),
        }
    }
}

/// Payment status of an order.
///
/// There is no real gateway; orders are recorded as paid at placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "payment_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    #[default]
    Paid,
    Refunded,
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "payment_method", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    CashOnDelivery,
    Card,
    Wallet,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_moves_one_step() {
        let mut status = OrderStatus::INITIAL;
        for expected in [
            OrderStatus::Preparing,
            OrderStatus::Delivering,
            OrderStatus::Completed,
        ] {
            status = status.transition_to(expected).unwrap();
        }
        assert_eq!(status, OrderStatus::Completed);
        assert!(status.is_terminal());
    }

    #[test]
    fn test_skipping_steps_is_rejected() {
        assert!(
            OrderStatus::Confirmed
                .transition_to(OrderStatus::Completed)
                .is_err()
        );
        assert!(
            OrderStatus::Delivering
                .transition_to(OrderStatus::Preparing)
                .is_err()
        );
    }

    #[test]
    fn test_same_status_is_rejected() {
        assert_eq!(
            OrderStatus::Preparing.transition_to(OrderStatus::Preparing),
            Err(StatusTransitionError {
                from: OrderStatus::Preparing,
                to: OrderStatus::Preparing,
            })
        );
    }

    #[test]
    fn test_cancel_rules() {
        assert_eq!(
            OrderStatus::Confirmed.transition_to(OrderStatus::Cancelled),
            Ok(OrderStatus::Cancelled)
        );
        assert!(
            OrderStatus::Pending
                .transition_to(OrderStatus::Cancelled)
                .is_ok()
        );
        assert!(
            OrderStatus::Preparing
                .transition_to(OrderStatus::Cancelled)
                .is_ok()
        );
        assert!(
            OrderStatus::Delivering
                .transition_to(OrderStatus::Cancelled)
                .is_err()
        );
        assert!(
            OrderStatus::Completed
                .transition_to(OrderStatus::Cancelled)
                .is_err()
        );
        assert!(
            OrderStatus::Cancelled
                .transition_to(OrderStatus::Cancelled)
                .is_err()
        );
    }

    #[test]
    fn test_terminal_states_have_no_next() {
        assert_eq!(OrderStatus::Completed.next(), None);
        assert_eq!(OrderStatus::Cancelled.next(), None);
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(
            "Delivering".parse::<OrderStatus>().unwrap(),
            OrderStatus::Delivering
        );
        assert_eq!(
            "canceled".parse::<OrderStatus>().unwrap(),
            OrderStatus::Cancelled
        );
        assert!("shipped".parse::<OrderStatus>().is_err());
        assert_eq!(OrderStatus::Preparing.to_string(), "preparing");
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::CashOnDelivery).unwrap(),
            "\"cash_on_delivery\""
        );
        assert_eq!(
            serde_json::from_str::<OrderStatus>("\"completed\"").unwrap(),
            OrderStatus::Completed
        );
        assert_eq!(PaymentStatus::default(), PaymentStatus::Paid);
    }
}
