//! Amount type with 6-decimal fixed-point precision
//!
//! All value in the protocol is exchanged as unsigned integers scaled by
//! 10^6. Parsing and formatting of human decimal strings belongs to the
//! handler layer; the core only does checked integer arithmetic.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of fractional digits in an [`Amount`]
pub const AMOUNT_DECIMALS: u32 = 6;

/// Scale factor between whole currency units and raw amount values
pub const UNIT: u64 = 1_000_000;

/// An unsigned fixed-point currency amount (6 fractional digits).
///
/// Arithmetic is checked: operations return `None` on overflow or
/// underflow and callers map that into a typed protocol error.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Amount(pub u64);

impl Amount {
    /// Create an amount from a raw scaled value
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Create an amount from whole currency units
    pub fn from_units(units: u64) -> Self {
        Self(units * UNIT)
    }

    /// The zero amount
    pub fn zero() -> Self {
        Self(0)
    }

    /// Raw scaled value
    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Checked subtraction (fails instead of wrapping below zero)
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Divide by a scalar, truncating toward zero
    pub fn checked_div(self, divisor: u64) -> Option<Self> {
        self.0.checked_div(divisor).map(Self)
    }

    /// Scale by basis points (10000 = 100%, no adjustment)
    pub fn basis_points(self, bps: u32) -> Option<Self> {
        let scaled = (self.0 as u128).checked_mul(bps as u128)? / 10_000;
        u64::try_from(scaled).ok().map(Self)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:06}", self.0 / UNIT, self.0 % UNIT)
    }
}
