//! Line, cart and order totals.
//!
//! All arithmetic is done on [`Decimal`] and rounded to cents only where a
//! value is persisted or shown, so intermediate sums never drift. Every
//! operation is checked: an amount outside the decimal range is a
//! [`MoneyError`], never a panic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::money::ensure_storable;
use crate::types::{MoneyError, round_money};

/// Most units of one food a single cart or order line may hold.
pub const MAX_LINE_QUANTITY: i32 = 99;

/// A line quantity outside `1..=MAX_LINE_QUANTITY`.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("quantity must be between 1 and {MAX_LINE_QUANTITY}, got {0}")]
pub struct QuantityOutOfRange(pub i32);

/// Check a requested line quantity.
///
/// # Errors
///
/// Returns `QuantityOutOfRange` below 1 or above [`MAX_LINE_QUANTITY`].
pub fn check_quantity(quantity: i32) -> Result<i32, QuantityOutOfRange> {
    if !(1..=MAX_LINE_QUANTITY).contains(&quantity) {
        return Err(QuantityOutOfRange(quantity));
    }
    Ok(quantity)
}

/// One priced line of a cart or order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedLine {
    pub unit_price: Decimal,
    pub quantity: i32,
}

impl PricedLine {
    #[must_use]
    pub const fn new(unit_price: Decimal, quantity: i32) -> Self {
        Self {
            unit_price,
            quantity,
        }
    }

    /// `unit_price * quantity`, rounded to cents.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::Overflow` if the product leaves the decimal range.
    pub fn subtotal(&self) -> Result<Decimal, MoneyError> {
        self.unit_price
            .checked_mul(Decimal::from(self.quantity))
            .map(round_money)
            .ok_or(MoneyError::Overflow)
    }
}

/// Sum of all line subtotals.
///
/// # Errors
///
/// Returns `MoneyError::Overflow` if a line or the sum leaves the decimal
/// range.
pub fn cart_total(lines: &[PricedLine]) -> Result<Decimal, MoneyError> {
    lines.iter().try_fold(Decimal::ZERO, |sum, line| {
        sum.checked_add(line.subtotal()?).ok_or(MoneyError::Overflow)
    })
}

/// Total quantity across all lines.
#[must_use]
pub fn item_count(lines: &[PricedLine]) -> i64 {
    lines.iter().map(|line| i64::from(line.quantity)).sum()
}

/// Money breakdown of a placed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub tax: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

impl OrderTotals {
    /// Compute totals for a set of lines.
    ///
    /// `discount_percent` is applied to the subtotal only. The total is
    /// `subtotal + delivery_fee - discount + tax` and is never negative.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::Overflow` if the arithmetic leaves the decimal
    /// range and `MoneyError::TooLarge` if the subtotal or total does not
    /// fit a stored money column.
    pub fn compute(
        lines: &[PricedLine],
        delivery_fee: Decimal,
        tax: Decimal,
        discount_percent: Option<Decimal>,
    ) -> Result<Self, MoneyError> {
        let subtotal = ensure_storable(cart_total(lines)?)?;
        let discount = match discount_percent {
            Some(pct) => percent_of(subtotal, pct)?.min(subtotal),
            None => Decimal::ZERO,
        };
        let total = subtotal
            .checked_add(delivery_fee)
            .and_then(|t| t.checked_sub(discount))
            .and_then(|t| t.checked_add(tax))
            .ok_or(MoneyError::Overflow)?;
        let total = ensure_storable(round_money(total).max(Decimal::ZERO))?;

        Ok(Self {
            subtotal,
            delivery_fee: round_money(delivery_fee),
            tax: round_money(tax),
            discount,
            total,
        })
    }
}

/// `amount * percent / 100`, rounded to cents.
///
/// # Errors
///
/// Returns `MoneyError::Overflow` if the product leaves the decimal range.
pub fn percent_of(amount: Decimal, percent: Decimal) -> Result<Decimal, MoneyError> {
    amount
        .checked_mul(percent)
        .and_then(|p| p.checked_div(Decimal::ONE_HUNDRED))
        .map(round_money)
        .ok_or(MoneyError::Overflow)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_line_subtotal() {
        assert_eq!(PricedLine::new(d("5.50"), 2).subtotal(), Ok(d("11.00")));
        assert_eq!(PricedLine::new(d("1.75"), 3).subtotal(), Ok(d("5.25")));
    }

    #[test]
    fn test_cart_total_and_count() {
        let lines = [
            PricedLine::new(d("3.00"), 2),
            PricedLine::new(d("2.50"), 1),
            PricedLine::new(d("1.50"), 4),
        ];
        assert_eq!(cart_total(&lines), Ok(d("14.50")));
        assert_eq!(item_count(&lines), 7);
        assert_eq!(cart_total(&[]), Ok(Decimal::ZERO));
    }

    #[test]
    fn test_burger_order_totals() {
        let lines = [PricedLine::new(d("5.50"), 2)];
        let totals = OrderTotals::compute(&lines, d("1.00"), Decimal::ZERO, None).unwrap();
        assert_eq!(totals.subtotal, d("11.00"));
        assert_eq!(totals.discount, Decimal::ZERO);
        assert_eq!(totals.total, d("12.00"));
    }

    #[test]
    fn test_discount_applies_to_subtotal_only() {
        let lines = [PricedLine::new(d("10.00"), 2)];
        let totals = OrderTotals::compute(&lines, d("1.00"), d("0.50"), Some(d("10"))).unwrap();
        assert_eq!(totals.discount, d("2.00"));
        assert_eq!(totals.total, d("19.50"));
    }

    #[test]
    fn test_total_never_negative() {
        let lines = [PricedLine::new(d("1.00"), 1)];
        let totals = OrderTotals::compute(&lines, Decimal::ZERO, d("-5.00"), Some(d("100"))).unwrap();
        assert_eq!(totals.discount, d("1.00"));
        assert_eq!(totals.total, Decimal::ZERO);
    }

    #[test]
    fn test_percent_rounds_half_away_from_zero() {
        assert_eq!(percent_of(d("0.05"), d("50")), Ok(d("0.03")));
        assert_eq!(percent_of(d("19.99"), d("15")), Ok(d("3.00")));
    }

    #[test]
    fn test_huge_amounts_are_errors_not_panics() {
        assert_eq!(
            PricedLine::new(Decimal::MAX, 2).subtotal(),
            Err(MoneyError::Overflow)
        );
        assert_eq!(percent_of(Decimal::MAX, d("10")), Err(MoneyError::Overflow));
        assert_eq!(
            cart_total(&[PricedLine::new(Decimal::MAX, 1), PricedLine::new(d("1"), 1)]),
            Err(MoneyError::Overflow)
        );
        assert_eq!(
            OrderTotals::compute(&[PricedLine::new(Decimal::MAX, 2)], d("1.00"), Decimal::ZERO, None),
            Err(MoneyError::Overflow)
        );
    }

    #[test]
    fn test_totals_must_fit_money_column() {
        let at_limit = [PricedLine::new(d("99999998.99"), 1)];
        let totals = OrderTotals::compute(&at_limit, d("1.00"), Decimal::ZERO, None).unwrap();
        assert_eq!(totals.total, d("99999999.99"));

        let over = [PricedLine::new(d("99999999.99"), 1)];
        assert_eq!(
            OrderTotals::compute(&over, d("1.00"), Decimal::ZERO, None),
            Err(MoneyError::TooLarge)
        );
        let many = [PricedLine::new(d("99999999.99"), MAX_LINE_QUANTITY)];
        assert_eq!(
            OrderTotals::compute(&many, Decimal::ZERO, Decimal::ZERO, None),
            Err(MoneyError::TooLarge)
        );
    }

    #[test]
    fn test_check_quantity_bounds() {
        assert_eq!(check_quantity(1), Ok(1));
        assert_eq!(check_quantity(MAX_LINE_QUANTITY), Ok(MAX_LINE_QUANTITY));
        assert_eq!(check_quantity(0), Err(QuantityOutOfRange(0)));
        assert_eq!(
            check_quantity(MAX_LINE_QUANTITY + 1),
            Err(QuantityOutOfRange(MAX_LINE_QUANTITY + 1))
        );
        assert_eq!(check_quantity(i32::MAX), Err(QuantityOutOfRange(i32::MAX)));
    }
}
