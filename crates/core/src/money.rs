//! Monetary amounts, discounts and order quantities.
//!
//! Amounts are integers in the currency's minor unit (cents) so pricing never
//! touches floating point. A single currency is assumed.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::id::StockItemId;
use crate::value_object::ValueObject;

/// Minor units per major unit of the shop currency.
pub const MINOR_UNITS_PER_MAJOR: u64 = 100;

/// A non-negative amount in minor currency units.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_minor(minor: u64) -> Self {
        Self(minor)
    }

    /// Whole major units (e.g. dollars). `None` on overflow.
    pub fn from_major(major: u64) -> Option<Self> {
        major.checked_mul(MINOR_UNITS_PER_MAJOR).map(Self)
    }

    pub const fn minor_units(self) -> u64 {
        self.0
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}.{:02}",
            self.0 / MINOR_UNITS_PER_MAJOR,
            self.0 % MINOR_UNITS_PER_MAJOR
        )
    }
}

impl ValueObject for Money {}

/// Basis points in a whole (100%).
pub const BASIS_POINTS_PER_UNIT: u16 = 10_000;

/// Discount fraction in `0..=1`, stored as basis points.
///
/// Serialized as the fraction (`0.1` for ten percent) to match how catalog
/// documents express it.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Discount(u16);

impl Discount {
    pub const NONE: Discount = Discount(0);

    pub fn from_basis_points(bp: u16) -> DomainResult<Self> {
        if bp > BASIS_POINTS_PER_UNIT {
            return Err(DomainError::validation(format!(
                "discount must be between 0 and 1 (got {bp} basis points)"
            )));
        }
        Ok(Self(bp))
    }

    /// Build from a fraction, rounding to the nearest basis point.
    pub fn from_fraction(fraction: f64) -> DomainResult<Self> {
        if !fraction.is_finite() || !(0.0..=1.0).contains(&fraction) {
            return Err(DomainError::validation(format!(
                "discount must be between 0 and 1 (got {fraction})"
            )));
        }
        let bp = (fraction * f64::from(BASIS_POINTS_PER_UNIT)).round() as u16;
        Self::from_basis_points(bp)
    }

    pub const fn basis_points(self) -> u16 {
        self.0
    }

    /// Basis points of the price that remain payable.
    pub const fn payable_basis_points(self) -> u16 {
        BASIS_POINTS_PER_UNIT - self.0
    }

    pub fn as_fraction(self) -> f64 {
        f64::from(self.0) / f64::from(BASIS_POINTS_PER_UNIT)
    }
}

impl TryFrom<f64> for Discount {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::from_fraction(value)
    }
}

impl From<Discount> for f64 {
    fn from(value: Discount) -> Self {
        value.as_fraction()
    }
}

impl ValueObject for Discount {}

/// A strictly positive number of units.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    pub fn new(quantity: i64) -> DomainResult<Self> {
        Self::checked(None, quantity)
    }

    /// Like [`Quantity::new`], naming the item in the error.
    pub fn for_item(item_id: StockItemId, quantity: i64) -> DomainResult<Self> {
        Self::checked(Some(item_id), quantity)
    }

    fn checked(item_id: Option<StockItemId>, quantity: i64) -> DomainResult<Self> {
        match u32::try_from(quantity) {
            Ok(q) if q > 0 => Ok(Self(q)),
            _ => Err(DomainError::invalid_quantity(item_id, quantity)),
        }
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    pub fn checked_add(self, other: Quantity) -> DomainResult<Quantity> {
        self.0
            .checked_add(other.0)
            .map(Quantity)
            .ok_or_else(|| DomainError::validation("quantity overflow"))
    }
}

impl TryFrom<i64> for Quantity {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(value: Quantity) -> Self {
        value.0
    }
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl ValueObject for Quantity {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_displays_major_and_minor_units() {
        assert_eq!(Money::from_minor(27_000).to_string(), "270.00");
        assert_eq!(Money::from_minor(5).to_string(), "0.05");
        assert_eq!(Money::from_major(50), Some(Money::from_minor(5_000)));
    }

    #[test]
    fn discount_rounds_fraction_to_basis_points() {
        assert_eq!(Discount::from_fraction(0.1).unwrap().basis_points(), 1_000);
        assert_eq!(Discount::from_fraction(0.0).unwrap(), Discount::NONE);
        assert_eq!(Discount::from_fraction(1.0).unwrap().payable_basis_points(), 0);
    }

    #[test]
    fn discount_outside_unit_interval_is_rejected() {
        assert!(Discount::from_fraction(-0.01).is_err());
        assert!(Discount::from_fraction(1.5).is_err());
        assert!(Discount::from_fraction(f64::NAN).is_err());
        assert!(Discount::from_basis_points(10_001).is_err());
    }

    #[test]
    fn discount_serializes_as_fraction() {
        let d = Discount::from_basis_points(2_500).unwrap();
        assert_eq!(serde_json::to_string(&d).unwrap(), "0.25");
        let back: Discount = serde_json::from_str("0.25").unwrap();
        assert_eq!(back, d);
        assert!(serde_json::from_str::<Discount>("2").is_err());
    }

    #[test]
    fn quantity_rejects_zero_and_negative() {
        assert!(Quantity::new(1).is_ok());
        assert_eq!(
            Quantity::new(0).unwrap_err(),
            DomainError::invalid_quantity(None, 0)
        );
        assert!(Quantity::new(-4).is_err());
        assert!(Quantity::new(i64::from(u32::MAX) + 1).is_err());
    }

    #[test]
    fn quantity_deserialization_validates() {
        let q: Quantity = serde_json::from_str("3").unwrap();
        assert_eq!(q.get(), 3);
        assert!(serde_json::from_str::<Quantity>("0").is_err());
        assert!(serde_json::from_str::<Quantity>("-2").is_err());
    }

    #[test]
    fn quantity_addition_reports_overflow() {
        let max = Quantity::new(i64::from(u32::MAX)).unwrap();
        let one = Quantity::new(1).unwrap();
        assert!(max.checked_add(one).is_err());
        assert_eq!(one.checked_add(one).unwrap().get(), 2);
    }
}
