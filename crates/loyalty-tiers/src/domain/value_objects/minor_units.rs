//! Minor Units Value Object
//!
//! Money expressed in the smallest indivisible currency denomination (cents).
//! Integer arithmetic only; decimals appear at the display boundary.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Monetary amount in minor currency units
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MinorUnits(i64);

impl MinorUnits {
    pub const ZERO: MinorUnits = MinorUnits(0);

    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> i64 {
        self.0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Add two amounts, `None` on overflow
    pub fn checked_add(self, other: MinorUnits) -> Option<MinorUnits> {
        self.0.checked_add(other.0).map(MinorUnits)
    }

    /// Subtract, clamping the result at zero
    pub fn saturating_sub(self, other: MinorUnits) -> MinorUnits {
        MinorUnits(self.0.saturating_sub(other.0).max(0))
    }

    /// Convert to a major-unit decimal for display (`scale` = decimal places)
    pub fn to_decimal(self, scale: u32) -> Decimal {
        Decimal::new(self.0, scale)
    }
}

impl From<i64> for MinorUnits {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<i32> for MinorUnits {
    fn from(value: i32) -> Self {
        Self(i64::from(value))
    }
}

impl fmt::Display for MinorUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(MinorUnits::new(1000) < MinorUnits::new(5000));
        assert!(MinorUnits::new(-1).is_negative());
        assert!(!MinorUnits::ZERO.is_positive());
    }

    #[test]
    fn test_checked_add_overflow() {
        assert_eq!(MinorUnits::new(i64::MAX).checked_add(MinorUnits::new(1)), None);
        assert_eq!(
            MinorUnits::new(700).checked_add(MinorUnits::new(300)),
            Some(MinorUnits::new(1000))
        );
    }

    #[test]
    fn test_saturating_sub_clamps_at_zero() {
        assert_eq!(MinorUnits::new(500).saturating_sub(MinorUnits::new(800)), MinorUnits::ZERO);
        assert_eq!(MinorUnits::new(800).saturating_sub(MinorUnits::new(500)), MinorUnits::new(300));
    }

    #[test]
    fn test_to_decimal() {
        assert_eq!(MinorUnits::new(1050).to_decimal(2), Decimal::new(1050, 2));
        assert_eq!(MinorUnits::new(1050).to_decimal(0), Decimal::from(1050));
    }
}
