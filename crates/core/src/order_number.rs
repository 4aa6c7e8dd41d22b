//! Human-readable order numbers.
//!
//! Format: `AMK-YYYYMMDDHHMMSS-XXXX`, a UTC timestamp followed by a short
//! random suffix of uppercase letters and digits. Uniqueness is enforced by
//! the database; this module only builds and checks the string.

use chrono::{DateTime, Utc};

/// Prefix shared by every order number.
pub const PREFIX: &str = "AMK";

/// Number of characters in the random suffix.
pub const SUFFIX_LEN: usize = 4;

/// Characters the suffix is drawn from.
pub const SUFFIX_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Build an order number from a timestamp and a suffix.
///
/// The suffix is used as given; callers draw it from [`SUFFIX_ALPHABET`].
#[must_use]
pub fn format_order_number(at: DateTime<Utc>, suffix: &str) -> String {
    format!("{PREFIX}-{}-{suffix}", at.format(TIMESTAMP_FORMAT))
}

/// Build an order number, picking suffix characters with `pick`.
///
/// `pick` receives the alphabet length and returns an index into it; any
/// out-of-range index wraps.
pub fn generate_order_number(at: DateTime<Utc>, mut pick: impl FnMut(usize) -> usize) -> String {
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| {
            let idx = pick(SUFFIX_ALPHABET.len()) % SUFFIX_ALPHABET.len();
            SUFFIX_ALPHABET.get(idx).copied().map_or('0', char::from)
        })
        .collect();
    format_order_number(at, &suffix)
}

/// Whether `s` has the shape of an order number.
#[must_use]
pub fn is_order_number(s: &str) -> bool {
    let mut parts = s.split('-');
    let (Some(prefix), Some(stamp), Some(suffix), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    prefix == PREFIX
        && stamp.len() == 14
        && stamp.bytes().all(|b| b.is_ascii_digit())
        && suffix.len() == SUFFIX_LEN
        && suffix.bytes().all(|b| SUFFIX_ALPHABET.contains(&b))
}
