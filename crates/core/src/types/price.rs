//! Type-safe price representation using decimal arithmetic.
//!
//! The catalog quotes every price in Bangladeshi Taka as a plain number, so a
//! [`Price`] is a non-negative amount with no currency attached. Decimal
//! arithmetic keeps cart totals exact no matter how many lines are summed.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Symbol used when rendering prices.
pub const CURRENCY_SYMBOL: &str = "৳";

/// Largest accepted unit price: one billion Taka.
const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),

    /// The amount is above [`Price::MAX`].
    #[error("price cannot exceed {max} (got {0})", max = MAX_AMOUNT)]
    TooLarge(Decimal),
}

/// A non-negative amount of money.
///
/// Constructed prices never exceed [`Price::MAX`]. Sums and products of
/// prices saturate at `Decimal::MAX` instead of overflowing, so a cart total
/// can always be computed.
///
/// Serializes as a decimal string (`"500"`) and deserializes from either a
/// JSON number or a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// The largest price [`Price::new`] accepts.
    pub const MAX: Self = Self(MAX_AMOUNT);

    const SATURATED: Self = Self(Decimal::MAX);

    /// Create a new price.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount` is below zero, or
    /// [`PriceError::TooLarge`] if it is above [`Price::MAX`].
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        if amount > MAX_AMOUNT {
            return Err(PriceError::TooLarge(amount));
        }
        Ok(Self(amount))
    }

    /// Create a price from a whole number of Taka.
    #[must_use]
    pub fn from_whole(amount: u32) -> Self {
        Self(Decimal::from(amount))
    }

    /// Get the underlying amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply by a quantity, saturating on overflow.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        self.0
            .checked_mul(Decimal::from(quantity))
            .map_or(Self::SATURATED, Self)
    }

    /// Format for display (e.g., "৳500").
    #[must_use]
    pub fn display(&self) -> String {
        format!("{CURRENCY_SYMBOL}{}", self.0.normalize())
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl Add for Price {
    type Output = Self;

    /// Saturates on overflow.
    fn add(self, rhs: Self) -> Self {
        self.0.checked_add(rhs.0).map_or(Self::SATURATED, Self)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}
