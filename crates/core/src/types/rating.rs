//! Review ratings and the derived food rating.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Decimal places kept for a food's average rating (`NUMERIC(3,2)`).
pub const AVERAGE_RATING_SCALE: u32 = 2;

/// Error returned for a rating outside 1..=5.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("rating must be between {min} and {max}, got {got}", min = Rating::MIN, max = Rating::MAX)]
pub struct RatingError {
    /// The rejected value.
    pub got: i64,
}

/// A single review score, 1 to 5 stars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i16")]
pub struct Rating(i16);

impl Rating {
    /// Lowest allowed score.
    pub const MIN: i16 = 1;
    /// Highest allowed score.
    pub const MAX: i16 = 5;

    /// Validate a raw score.
    ///
    /// # Errors
    ///
    /// Returns `RatingError` if the score is outside 1..=5.
    pub fn new(value: i64) -> Result<Self, RatingError> {
        match i16::try_from(value) {
            Ok(v) if (Self::MIN..=Self::MAX).contains(&v) => Ok(Self(v)),
            _ => Err(RatingError { got: value }),
        }
    }

    /// The score as stored in the `reviews.rating` column.
    #[must_use]
    pub const fn get(self) -> i16 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = RatingError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for i16 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

/// Arithmetic mean of review scores, rounded half away from zero to two
/// decimal places.
///
/// An empty slice yields zero. The result is always recomputed from the full
/// set of scores; it is never adjusted incrementally.
#[must_use]
pub fn average_rating(scores: &[i16]) -> Decimal {
    if scores.is_empty() {
        return Decimal::ZERO;
    }
    let sum: i64 = scores.iter().map(|&s| i64::from(s)).sum();
    let count = i64::try_from(scores.len()).unwrap_or(i64::MAX);
    (Decimal::from(sum) / Decimal::from(count))
        .round_dp_with_strategy(AVERAGE_RATING_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::new(0).is_err());
        assert_eq!(Rating::new(1).unwrap().get(), 1);
        assert_eq!(Rating::new(5).unwrap().get(), 5);
        assert_eq!(Rating::new(6), Err(RatingError { got: 6 }));
        assert!(Rating::new(i64::from(i16::MAX) + 1).is_err());
    }

    #[test]
    fn test_rating_deserialize_rejects_out_of_range() {
        assert_eq!(serde_json::from_str::<Rating>("4").unwrap().get(), 4);
        assert!(serde_json::from_str::<Rating>("9").is_err());
    }

    #[test]
    fn test_average_of_nothing_is_zero() {
        assert_eq!(average_rating(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_average_is_plain_mean() {
        assert_eq!(average_rating(&[5]), d("5"));
        assert_eq!(average_rating(&[4, 5]), d("4.5"));
        assert_eq!(average_rating(&[1, 2, 2]), d("1.67"));
        assert_eq!(average_rating(&[5, 5, 4]), d("4.67"));
    }

    #[test]
    fn test_overwriting_a_score_changes_the_mean() {
        // One user re-rates from 1 to 5: the mean follows the current set only.
        let before = average_rating(&[1, 3]);
        let after = average_rating(&[5, 3]);
        assert_eq!(before, d("2"));
        assert_eq!(after, d("4"));
    }
}
