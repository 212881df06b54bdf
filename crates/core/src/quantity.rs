//! Non-negative decimal quantity.
//!
//! Every stock figure (sealed units, amount needed, the amount one barcode
//! scan represents) is a `Quantity`. The type cannot hold a negative value, so
//! the "never below zero" invariant holds structurally: decrements go through
//! either `checked_sub` (refuse) or `saturating_sub` (floor at zero).

use core::ops::Add;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// A non-negative decimal amount with at most two decimal places.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Quantity(Decimal);

impl Quantity {
    /// Number of decimal places a quantity may carry.
    pub const SCALE: u32 = 2;

    pub const ZERO: Quantity = Quantity(Decimal::ZERO);
    pub const ONE: Quantity = Quantity(Decimal::ONE);

    /// Validate user input: non-negative, at most two decimal places and at
    /// most ten significant digits.
    pub fn new(value: Decimal) -> DomainResult<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(DomainError::validation(format!(
                "quantity cannot be negative (got {value})"
            )));
        }
        let value = value.normalize();
        if value.scale() > Self::SCALE {
            return Err(DomainError::validation(format!(
                "quantity allows at most {} decimal places (got {value})",
                Self::SCALE
            )));
        }
        if value > max_input() {
            return Err(DomainError::validation(format!(
                "quantity cannot exceed {} (got {value})",
                max_input()
            )));
        }
        // Drop a possible negative sign on zero.
        Ok(Self(value.abs()))
    }

    /// Rebuild from the fixed-point representation stores persist
    /// (hundredths of a unit).
    pub fn from_hundredths(hundredths: i64) -> DomainResult<Self> {
        if hundredths < 0 {
            return Err(DomainError::validation(format!(
                "stored quantity cannot be negative (got {hundredths} hundredths)"
            )));
        }
        Ok(Self(Decimal::new(hundredths, Self::SCALE).normalize()))
    }

    /// Fixed-point representation: hundredths of a unit.
    pub fn hundredths(&self) -> i64 {
        (self.0 * Decimal::ONE_HUNDRED).to_i64().unwrap_or(i64::MAX)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        !self.0.is_zero()
    }

    /// `self - rhs`, or `None` when `rhs` exceeds `self`.
    pub fn checked_sub(self, rhs: Quantity) -> Option<Quantity> {
        if rhs > self {
            None
        } else {
            Some(Self((self.0 - rhs.0).normalize()))
        }
    }

    /// `max(0, self - rhs)`.
    pub fn saturating_sub(self, rhs: Quantity) -> Quantity {
        self.checked_sub(rhs).unwrap_or(Self::ZERO)
    }
}

fn max_input() -> Decimal {
    Decimal::new(9_999_999_999, Quantity::SCALE)
}

impl Add for Quantity {
    type Output = Quantity;

    fn add(self, rhs: Quantity) -> Quantity {
        Self((self.0 + rhs.0).normalize())
    }
}

impl TryFrom<Decimal> for Quantity {
    type Error = DomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for Decimal {
    fn from(value: Quantity) -> Self {
        value.0
    }
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl core::str::FromStr for Quantity {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str_exact(s.trim())
            .map_err(|e| DomainError::validation(format!("invalid quantity {s:?}: {e}")))?;
        Self::new(value)
    }
}
