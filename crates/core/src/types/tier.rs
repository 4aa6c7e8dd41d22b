//! Member tier derived from order history.

use serde::{Deserialize, Serialize};

/// Loyalty classification of a user.
///
/// The tier is a pure function of how many orders the user has placed and is
/// recomputed whenever the profile is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MemberTier {
    #[serde(rename = "New Guest")]
    NewGuest,
    Regular,
    Member,
    #[serde(rename = "VIP")]
    Vip,
}

impl MemberTier {
    /// Derive the tier from a total order count.
    ///
    /// | orders | tier |
    /// |--------|------|
    /// | 0 | New Guest |
    /// | 1-4 | Regular |
    /// | 5-9 | Member |
    /// | 10+ | VIP |
    #[must_use]
    pub const fn from_order_count(count: i64) -> Self {
        match count {
            i64::MIN..=0 => Self::NewGuest,
            1..=4 => Self::Regular,
            5..=9 => Self::Member,
            _ => Self::Vip,
        }
    }

    /// Label stored in `users.member_tier`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NewGuest => "New Guest",
            Self::Regular => "Regular",
            Self::Member => "Member",
            Self::Vip => "VIP",
        }
    }
}

impl std::fmt::Display for MemberTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MemberTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "New Guest" => Ok(Self::NewGuest),
            "Regular" => Ok(Self::Regular),
            "Member" => Ok(Self::Member),
            "VIP" => Ok(Self::Vip),
            other => Err(format!("invalid member tier: {other}")),
        }
    }
}

// Stored as TEXT using the display label.
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for MemberTier {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for MemberTier {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(s.parse::<Self>()?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for MemberTier {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(MemberTier::from_order_count(0), MemberTier::NewGuest);
        assert_eq!(MemberTier::from_order_count(1), MemberTier::Regular);
        assert_eq!(MemberTier::from_order_count(4), MemberTier::Regular);
        assert_eq!(MemberTier::from_order_count(5), MemberTier::Member);
        assert_eq!(MemberTier::from_order_count(9), MemberTier::Member);
        assert_eq!(MemberTier::from_order_count(10), MemberTier::Vip);
        assert_eq!(MemberTier::from_order_count(250), MemberTier::Vip);
    }

    #[test]
    fn test_label_roundtrip() {
        for tier in [
            MemberTier::NewGuest,
            MemberTier::Regular,
            MemberTier::Member,
            MemberTier::Vip,
        ] {
            assert_eq!(tier.as_str().parse::<MemberTier>().unwrap(), tier);
        }
        assert!("Gold".parse::<MemberTier>().is_err());
    }

    #[test]
    fn test_serde_uses_labels() {
        assert_eq!(
            serde_json::to_string(&MemberTier::NewGuest).unwrap(),
            "\"New Guest\""
        );
        assert_eq!(serde_json::to_string(&MemberTier::Vip).unwrap(), "\"VIP\"");
    }
}
