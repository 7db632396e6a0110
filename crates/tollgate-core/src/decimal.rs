//! Precision-safe decimal types for trading.
//!
//! Uses `rust_decimal` for exact decimal arithmetic, so tick-size and
//! notional checks do not inherit binary floating-point error.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Price with exact decimal precision.
///
/// A zero price on an order request means "no price" (market order).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(pub Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Floored remainder of this price divided by `tick`.
    ///
    /// The result takes the sign of `tick`, so a negative price still lands
    /// in `[0, tick)` for a positive tick. Returns `None` for a zero tick.
    #[inline]
    pub fn remainder(&self, tick: Price) -> Option<Decimal> {
        if tick.is_zero() {
            return None;
        }
        let rem = self.0.checked_rem(tick.0)?;
        if !rem.is_zero() && rem.is_sign_negative() != tick.0.is_sign_negative() {
            rem.checked_add(tick.0)
        } else {
            Some(rem)
        }
    }

    /// Same value with trailing zeros stripped (`10.50` -> `10.5`).
    #[inline]
    pub fn normalized(&self) -> Self {
        Self(self.0.normalize())
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Price {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

/// Order volume with exact decimal precision.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Size(pub Decimal);

impl Size {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Notional value: volume * price * contract multiplier.
    ///
    /// `None` when the product overflows `Decimal`.
    #[inline]
    pub fn notional(&self, price: Price, multiplier: Decimal) -> Option<Decimal> {
        self.0.checked_mul(price.0)?.checked_mul(multiplier)
    }

    #[inline]
    pub fn normalized(&self) -> Self {
        Self(self.0.normalize())
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Size {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Size {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}
