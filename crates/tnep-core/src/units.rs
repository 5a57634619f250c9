//! Unit newtypes for network design quantities.
//!
//! Power and length appear side by side in every link record (capacity in MW,
//! length in km), and mixing the two is an easy mistake when everything is a
//! raw `f64`. These wrappers keep them apart at compile time.
//!
//! ```
//! use tnep_core::units::{Kilometers, Megawatts};
//!
//! let capacity = Megawatts(1000.0) * 2.0;
//! let span = Kilometers(120.0) + Kilometers(30.0);
//! assert_eq!(capacity.value(), 2000.0);
//! assert_eq!(span.value(), 150.0);
//!
//! // let wrong = capacity + span; // does not compile
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Div, Mul, Neg, Sub};

macro_rules! unit_newtype {
    ($(#[$meta:meta])* $name:ident, $symbol:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub f64);

        impl $name {
            pub const ZERO: Self = Self(0.0);

            #[inline]
            pub const fn new(value: f64) -> Self {
                Self(value)
            }

            #[inline]
            pub const fn value(self) -> f64 {
                self.0
            }

            #[inline]
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }
        }

        impl Add for $name {
            type Output = Self;
            fn add(self, rhs: Self) -> Self {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $name {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self {
                Self(self.0 - rhs.0)
            }
        }

        impl Neg for $name {
            type Output = Self;
            fn neg(self) -> Self {
                Self(-self.0)
            }
        }

        // scaling by a plain factor keeps the unit, from either side
        impl Mul<f64> for $name {
            type Output = Self;
            fn mul(self, factor: f64) -> Self {
                Self(self.0 * factor)
            }
        }

        impl Mul<$name> for f64 {
            type Output = $name;
            fn mul(self, rhs: $name) -> $name {
                $name(self * rhs.0)
            }
        }

        /// Ratio of two quantities of the same unit.
        impl Div for $name {
            type Output = f64;
            fn div(self, rhs: Self) -> f64 {
                self.0 / rhs.0
            }
        }

        impl Sum for $name {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                iter.fold(Self::ZERO, Add::add)
            }
        }

        impl<'a> Sum<&'a $name> for $name {
            fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
                iter.copied().sum()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:.2} {}", self.0, $symbol)
            }
        }
    };
}

unit_newtype!(
    /// Active power in megawatts (MW).
    ///
    /// Positive values are generation capacity, negative values are demand.
    Megawatts,
    "MW"
);

unit_newtype!(
    /// Length in kilometers (km).
    ///
    /// Node coordinates are planar and expressed in the same unit, so Euclidean
    /// distances between nodes come out in km directly.
    Kilometers,
    "km"
);
