use crate::error::CheckoutError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// A non-negative monetary value.
///
/// Wraps `rust_decimal::Decimal` so prices and cart totals can never go
/// negative and never pick up floating point drift. Serialized as the bare
/// decimal; decoding a negative value fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self, CheckoutError> {
        if value >= Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(CheckoutError::invalid("price", "must not be negative"))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units.
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl TryFrom<Decimal> for Money {
    type Error = CheckoutError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_validation() {
        assert!(Money::new(dec!(0.0)).is_ok());
        assert!(Money::new(dec!(19.99)).is_ok());
        assert!(matches!(
            Money::new(dec!(-0.01)),
            Err(CheckoutError::Validation(_))
        ));
    }

    #[test]
    fn test_money_arithmetic() {
        let price = Money::new(dec!(19.99)).unwrap();
        assert_eq!(price.times(3).value(), dec!(59.97));
        assert_eq!(price.times(0), Money::ZERO);

        let total: Money = [price, price.times(2)].into_iter().sum();
        assert_eq!(total.value(), dec!(59.97));
    }

    #[test]
    fn test_money_display_two_places() {
        assert_eq!(Money::new(dec!(10)).unwrap().to_string(), "10.00");
        assert_eq!(Money::new(dec!(0.5)).unwrap().to_string(), "0.50");
    }

    #[test]
    fn test_money_rejects_negative_on_decode() {
        let ok: Money = serde_json::from_str("\"12.50\"").unwrap();
        assert_eq!(ok.value(), dec!(12.50));
        assert!(serde_json::from_str::<Money>("\"-1\"").is_err());
    }
}
