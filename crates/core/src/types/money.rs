//! Money helpers built on decimal arithmetic.
//!
//! All amounts are [`Decimal`] values in the currency's standard unit
//! (dollars, not cents) and are stored as `NUMERIC(10,2)`. Rounding goes
//! half away from zero: `0.125` becomes `0.13`, not the banker's `0.12`.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places kept for money amounts.
pub const MONEY_SCALE: u32 = 2;

/// Largest amount a `NUMERIC(10,2)` column holds: 99 999 999.99.
pub const MAX_MONEY: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, MONEY_SCALE);

/// Errors for amounts that cannot be a price.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// The amount is below zero.
    #[error("amount cannot be negative")]
    Negative,
    /// The amount has more precision than cents.
    #[error("amount must have at most {MONEY_SCALE} decimal places")]
    TooPrecise,
    /// The amount does not fit a stored money column.
    #[error("amount cannot exceed {MAX_MONEY}")]
    TooLarge,
    /// Arithmetic on the amount left the decimal range.
    #[error("amount is out of range")]
    Overflow,
}

/// Round an amount to cents, half away from zero.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Validate a catalog or client-supplied price.
///
/// # Errors
///
/// Returns `MoneyError::Negative` for amounts below zero,
/// `MoneyError::TooPrecise` for fractions of a cent and
/// `MoneyError::TooLarge` above [`MAX_MONEY`].
pub fn validate_price(amount: Decimal) -> Result<Decimal, MoneyError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(MoneyError::Negative);
    }
    if amount.normalize().scale() > MONEY_SCALE {
        return Err(MoneyError::TooPrecise);
    }
    ensure_storable(amount)
}

/// Check that a computed amount fits a stored money column.
///
/// # Errors
///
/// Returns `MoneyError::TooLarge` above [`MAX_MONEY`].
pub fn ensure_storable(amount: Decimal) -> Result<Decimal, MoneyError> {
    if amount > MAX_MONEY {
        return Err(MoneyError::TooLarge);
    }
    Ok(amount)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_round_money_half_away_from_zero() {
        assert_eq!(round_money(d("0.125")), d("0.13"));
        assert_eq!(round_money(d("2.675")), d("2.68"));
        assert_eq!(round_money(d("11.004")), d("11.00"));
    }

    #[test]
    fn test_validate_price() {
        assert_eq!(validate_price(d("5.50")), Ok(d("5.50")));
        assert_eq!(validate_price(d("0")), Ok(d("0")));
        assert_eq!(validate_price(d("-0.01")), Err(MoneyError::Negative));
        assert_eq!(validate_price(d("1.001")), Err(MoneyError::TooPrecise));
        // Trailing zeros are not extra precision.
        assert_eq!(validate_price(d("1.5000")), Ok(d("1.5000")));
    }

    #[test]
    fn test_max_money_matches_column_range() {
        assert_eq!(MAX_MONEY, d("99999999.99"));
        assert_eq!(validate_price(d("99999999.99")), Ok(d("99999999.99")));
        assert_eq!(
            validate_price(d("100000000.00")),
            Err(MoneyError::TooLarge)
        );
        assert_eq!(
            validate_price(Decimal::MAX),
            Err(MoneyError::TooLarge)
        );
    }
}
