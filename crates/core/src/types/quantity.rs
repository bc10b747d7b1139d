//! Cart quantities.
//!
//! A stored cart quantity is always at least one: an entry that would drop
//! to zero is deleted instead. [`RequestedQuantity`] is the parsed form of a
//! user-submitted quantity, where anything below one means "remove".

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a quantity.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    /// The input is not an integer.
    #[error("quantity must be a whole number, got {0:?}")]
    NotANumber(String),
    /// The input is an integer but larger than a cart line may hold.
    #[error("quantity must be at most {max}")]
    TooLarge {
        /// Maximum allowed quantity.
        max: i32,
    },
}

/// A quantity of at least one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Quantity(i32);

impl Quantity {
    /// One unit.
    pub const ONE: Self = Self(1);

    /// Create a quantity, returning `None` for values below one.
    #[must_use]
    pub const fn new(value: i32) -> Option<Self> {
        if value >= 1 { Some(Self(value)) } else { None }
    }

    /// The quantity as an `i32`.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }

    /// One more unit, saturating at `i32::MAX`.
    #[must_use]
    pub const fn increment(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// One less unit, never going below one.
    #[must_use]
    pub const fn decrement(self) -> Self {
        if self.0 > 1 { Self(self.0 - 1) } else { self }
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i32> for Quantity {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("quantity must be at least 1, got {value}"))
    }
}

impl From<Quantity> for i32 {
    fn from(q: Quantity) -> Self {
        q.0
    }
}

/// A quantity submitted by a user for an existing cart entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestedQuantity {
    /// Store this quantity.
    Set(Quantity),
    /// Zero or negative: remove the entry.
    Remove,
}

impl RequestedQuantity {
    /// Parse a raw form value.
    ///
    /// A missing value means one unit. Surrounding whitespace is ignored.
    /// Any integer below one (including negatives) asks for removal.
    ///
    /// # Errors
    ///
    /// Returns `QuantityError::NotANumber` if the input is not an integer and
    /// `QuantityError::TooLarge` if it does not fit in a cart line.
    pub fn parse(raw: Option<&str>) -> Result<Self, QuantityError> {
        let Some(raw) = raw else {
            return Ok(Self::Set(Quantity::ONE));
        };

        let value: i64 = raw
            .trim()
            .parse()
            .map_err(|_| QuantityError::NotANumber(raw.to_owned()))?;

        if value < 1 {
            return Ok(Self::Remove);
        }

        let value = i32::try_from(value).map_err(|_| QuantityError::TooLarge { max: i32::MAX })?;
        Ok(Quantity::new(value).map_or(Self::Remove, Self::Set))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Quantity {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i32 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i32 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Quantity {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <i32 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::try_from(raw)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Quantity {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i32 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_zero_and_negative() {
        assert!(Quantity::new(0).is_none());
        assert!(Quantity::new(-4).is_none());
        assert_eq!(Quantity::new(2).unwrap().get(), 2);
    }

    #[test]
    fn test_decrement_floors_at_one() {
        assert_eq!(Quantity::ONE.decrement(), Quantity::ONE);
        assert_eq!(Quantity::new(3).unwrap().decrement().get(), 2);
    }

    #[test]
    fn test_increment_saturates() {
        let max = Quantity::new(i32::MAX).unwrap();
        assert_eq!(max.increment(), max);
        assert_eq!(Quantity::ONE.increment().get(), 2);
    }

    #[test]
    fn test_parse_missing_defaults_to_one() {
        assert_eq!(
            RequestedQuantity::parse(None).unwrap(),
            RequestedQuantity::Set(Quantity::ONE)
        );
    }

    #[test]
    fn test_parse_positive() {
        assert_eq!(
            RequestedQuantity::parse(Some(" 5 ")).unwrap(),
            RequestedQuantity::Set(Quantity::new(5).unwrap())
        );
    }

    #[test]
    fn test_parse_zero_and_negative_remove() {
        assert_eq!(
            RequestedQuantity::parse(Some("0")).unwrap(),
            RequestedQuantity::Remove
        );
        assert_eq!(
            RequestedQuantity::parse(Some("-3")).unwrap(),
            RequestedQuantity::Remove
        );
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            RequestedQuantity::parse(Some("two")),
            Err(QuantityError::NotANumber(_))
        ));
        assert!(matches!(
            RequestedQuantity::parse(Some("")),
            Err(QuantityError::NotANumber(_))
        ));
        assert!(matches!(
            RequestedQuantity::parse(Some("1.5")),
            Err(QuantityError::NotANumber(_))
        ));
    }

    #[test]
    fn test_parse_too_large() {
        assert!(matches!(
            RequestedQuantity::parse(Some("99999999999")),
            Err(QuantityError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_serde_rejects_zero() {
        assert!(serde_json::from_str::<Quantity>("0").is_err());
        assert_eq!(serde_json::from_str::<Quantity>("4").unwrap().get(), 4);
    }
}
