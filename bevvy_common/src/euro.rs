use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const EURO_CURRENCY_CODE: &str = "EUR";

//--------------------------------------        Euro        ----------------------------------------------------------
/// An amount of money in Euro.
///
/// Amounts are plain `f64`s under the hood (they are stored as SQLite `REAL`s), so two amounts that
/// differ by less than [`Euro::TOLERANCE`] are treated as equal. `==` applies the tolerance; for
/// settlement decisions use [`Euro::covers`] and [`Euro::is_material`].
#[derive(Debug, Clone, Copy, Default, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Euro(f64);

impl PartialEq for Euro {
    fn eq(&self, other: &Self) -> bool {
        (self.0 - other.0).abs() < Self::TOLERANCE.0
    }
}

impl PartialOrd for Euro {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        if self == other {
            Some(std::cmp::Ordering::Equal)
        } else {
            self.0.partial_cmp(&other.0)
        }
    }
}

op!(binary Euro, Add, add);
op!(binary Euro, Sub, sub);
op!(inplace Euro, AddAssign, add_assign);
op!(inplace Euro, SubAssign, sub_assign);
op!(unary Euro, Neg, neg);

impl Sum for Euro {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in Euro: {0}")]
pub struct EuroConversionError(String);

impl From<f64> for Euro {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl FromStr for Euro {
    type Err = EuroConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().parse::<f64>().map_err(|e| EuroConversionError(format!("{s}: {e}")))?;
        if value.is_finite() {
            Ok(Self(value))
        } else {
            Err(EuroConversionError(format!("{s} is not a finite amount")))
        }
    }
}

impl Display for Euro {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} €", self.0)
    }
}

impl Euro {
    /// The margin within which two amounts are considered equal. Absorbs rounding noise from
    /// floating-point arithmetic on cent amounts.
    pub const TOLERANCE: Euro = Euro(0.01);

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn zero() -> Self {
        Self(0.0)
    }

    /// True if this amount pays off `owed`, up to [`Euro::TOLERANCE`].
    pub fn covers(&self, owed: Euro) -> bool {
        self.0 >= owed.0 - Self::TOLERANCE.0
    }

    /// True if the amount is large enough to matter, i.e. more than [`Euro::TOLERANCE`].
    /// Sub-cent residues are dropped rather than credited or chased.
    pub fn is_material(&self) -> bool {
        self.0 > Self::TOLERANCE.0
    }

    /// Rounds to whole cents.
    pub fn rounded(&self) -> Self {
        Self((self.0 * 100.0).round() / 100.0)
    }

    pub fn min(self, other: Euro) -> Euro {
        if self.0 <= other.0 {
            self
        } else {
            other
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn arithmetic() {
        let a = Euro::from(18.80);
        let b = Euro::from(1.20);
        assert_eq!(a + b, Euro::from(20.0));
        assert_eq!(a - b, Euro::from(17.6));
        let total: Euro = vec![Euro::from(2.5), Euro::from(3.0), Euro::from(4.5)].into_iter().sum();
        assert_eq!(total, Euro::from(10.0));
    }

    #[test]
    fn equality_absorbs_float_noise() {
        assert_eq!(Euro::from(12.00) + Euro::from(6.80), Euro::from(18.80));
        assert_eq!(Euro::from(0.1) + Euro::from(0.2), Euro::from(0.3));
        assert_ne!(Euro::from(18.80), Euro::from(18.78));
    }

    #[test]
    fn covers_applies_tolerance() {
        let owed = Euro::from(10.0);
        assert!(Euro::from(10.0).covers(owed));
        assert!(Euro::from(12.5).covers(owed));
        assert!(Euro::from(9.995).covers(owed));
        assert!(!Euro::from(9.98).covers(owed));
    }

    #[test]
    fn materiality() {
        assert!(Euro::from(2.5).is_material());
        assert!(!Euro::from(0.005).is_material());
        assert!(!Euro::zero().is_material());
        assert!(!(-Euro::from(1.0)).is_material());
    }

    #[test]
    fn parse_and_display() {
        let amount = "18.80".parse::<Euro>().unwrap();
        assert_eq!(amount, Euro::from(18.8));
        assert_eq!(amount.to_string(), "18.80 €");
        assert!("18,80".parse::<Euro>().is_err());
    }

    #[test]
    fn rounding() {
        assert_eq!(Euro::from(2.4999999999).rounded(), Euro::from(2.5));
        assert_eq!(Euro::from(10.0).rounded(), Euro::from(10.0));
    }
}
