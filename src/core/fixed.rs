//! Fixed-point arithmetic with an explicit 1024 scale
//!
//! Every quantity the genome and the energy model touch (senses, gene values,
//! mass, food) is an integer count of 1/1024ths. Division truncates toward
//! zero, exactly like integer division, and the evolutionary dynamics depend
//! on that rounding, so never route these values through floats.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Number of raw units in 1.0
pub const SCALE: i64 = 1024;

/// A fixed-point number, `raw / SCALE`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fixed(i64);

impl Fixed {
    pub const ZERO: Fixed = Fixed(0);
    pub const ONE: Fixed = Fixed(SCALE);
    pub const HALF: Fixed = Fixed(SCALE / 2);

    /// Wrap a raw value (already multiplied by SCALE)
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Whole number of units
    pub const fn from_int(units: i64) -> Self {
        Self(units * SCALE)
    }

    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Whole units, truncated
    pub const fn units(self) -> i64 {
        self.0 / SCALE
    }

    /// Scale-corrected product: `(a * b) / SCALE`
    ///
    /// Saturates instead of wrapping when the intermediate product leaves
    /// the i64 range.
    pub fn mul(self, rhs: Fixed) -> Fixed {
        Fixed(self.0.saturating_mul(rhs.0) / SCALE)
    }

    /// Scale-corrected quotient: `(a * SCALE) / b`, zero when `b` is zero
    pub fn div(self, rhs: Fixed) -> Fixed {
        if rhs.0 == 0 {
            return Fixed::ZERO;
        }
        Fixed(self.0.saturating_mul(SCALE) / rhs.0)
    }

    /// Multiply by a plain integer
    pub fn mul_int(self, k: i64) -> Fixed {
        Fixed(self.0.saturating_mul(k))
    }

    /// Divide by a plain integer, zero when `k` is zero
    pub fn div_int(self, k: i64) -> Fixed {
        if k == 0 {
            return Fixed::ZERO;
        }
        Fixed(self.0 / k)
    }

    pub fn abs(self) -> Fixed {
        Fixed(self.0.saturating_abs())
    }

    pub fn max(self, other: Fixed) -> Fixed {
        Fixed(self.0.max(other.0))
    }

    pub fn min(self, other: Fixed) -> Fixed {
        Fixed(self.0.min(other.0))
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl Add for Fixed {
    type Output = Fixed;
    fn add(self, rhs: Fixed) -> Fixed {
        Fixed(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Fixed {
    type Output = Fixed;
    fn sub(self, rhs: Fixed) -> Fixed {
        Fixed(self.0.saturating_sub(rhs.0))
    }
}

impl Neg for Fixed {
    type Output = Fixed;
    fn neg(self) -> Fixed {
        Fixed(self.0.saturating_neg())
    }
}

impl AddAssign for Fixed {
    fn add_assign(&mut self, rhs: Fixed) {
        *self = *self + rhs;
    }
}

impl SubAssign for Fixed {
    fn sub_assign(&mut self, rhs: Fixed) {
        *self = *self - rhs;
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0 as f64 / SCALE as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_is_scale_corrected() {
        let a = Fixed::from_raw(2048);
        let b = Fixed::from_raw(512);
        assert_eq!(a.mul(b), Fixed::from_raw(1024));
    }

    #[test]
    fn test_mul_truncates_toward_zero() {
        // -3 * 1 / 1024 truncates to 0, not -1
        assert_eq!(Fixed::from_raw(-3).mul(Fixed::from_raw(1)), Fixed::ZERO);
        assert_eq!(Fixed::from_raw(1000).mul(Fixed::from_raw(1000)), Fixed::from_raw(976));
    }

    #[test]
    fn test_mul_saturates() {
        let big = Fixed::from_raw(i64::MAX / 2);
        assert_eq!(big.mul(big), Fixed::from_raw(i64::MAX / SCALE));
    }

    #[test]
    fn test_div_by_zero_is_zero() {
        assert_eq!(Fixed::ONE.div(Fixed::ZERO), Fixed::ZERO);
        assert_eq!(Fixed::ONE.div_int(0), Fixed::ZERO);
    }

    #[test]
    fn test_units_and_display() {
        let f = Fixed::from_int(3) + Fixed::HALF;
        assert_eq!(f.units(), 3);
        assert_eq!(format!("{}", f), "3.500");
    }
}
