//! Fixed-point currency amounts.
//!
//! Prices are stored as `NUMERIC(_, 2)` in the database and carried as
//! [`rust_decimal::Decimal`] in memory. All arithmetic on line subtotals and
//! order totals goes through this type, so no floating point ever touches a
//! currency value.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Symbol printed in front of every displayed amount.
pub const CURRENCY_SYMBOL: &str = "£";

/// Errors that can occur when parsing a [`Price`] from user input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input string is empty.
    #[error("price cannot be empty")]
    Empty,
    /// The input is not a decimal number.
    #[error("price must be a number")]
    NotANumber,
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,
    /// The amount has more than two decimal places.
    #[error("price can have at most 2 decimal places")]
    TooPrecise,
    /// The amount does not fit the catalog column.
    #[error("price must be at most {max}")]
    TooLarge {
        /// Largest accepted amount.
        max: Decimal,
    },
}

/// A non-negative amount of money with two decimal places.
///
/// ## Examples
///
/// ```
/// use printshop_core::Price;
///
/// let unit: Price = "9.99".parse().unwrap();
/// assert_eq!(unit.times(2).to_string(), "£19.98");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Largest price a catalog product can carry (`NUMERIC(8, 2)`).
    pub const MAX_PRODUCT_PRICE: Decimal = Decimal::from_parts(99_999_999, 0, 0, false, 2);

    /// Largest total an order can carry (`NUMERIC(10, 2)`).
    pub const MAX_ORDER_TOTAL: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a decimal amount, rounding to two places.
    #[must_use]
    pub fn new(amount: Decimal) -> Self {
        Self(amount.round_dp(2))
    }

    /// Build a price from minor units (pence).
    #[must_use]
    pub fn from_minor(minor: i64) -> Self {
        Self(Decimal::new(minor, 2))
    }

    /// Parse a catalog price entered in a form.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, not a number, negative, has more
    /// than two decimal places, or exceeds [`Self::MAX_PRODUCT_PRICE`].
    pub fn parse(input: &str) -> Result<Self, PriceError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(PriceError::Empty);
        }

        let amount = Decimal::from_str(input).map_err(|_| PriceError::NotANumber)?;

        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        if amount.normalize().scale() > 2 {
            return Err(PriceError::TooPrecise);
        }
        if amount > Self::MAX_PRODUCT_PRICE {
            return Err(PriceError::TooLarge {
                max: Self::MAX_PRODUCT_PRICE,
            });
        }

        Ok(Self(amount.round_dp(2)))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// This price multiplied by a quantity, exactly.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{CURRENCY_SYMBOL}{:.2}", self.0)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self::new(amount)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
