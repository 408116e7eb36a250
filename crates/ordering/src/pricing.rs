//! Server-side pricing.
//!
//! `line = unit_cost * (1 - discount) * quantity`, evaluated exactly in
//! integer arithmetic (minor units x basis points) and rounded once to minor
//! units with round-half-even.

use armory_core::money::BASIS_POINTS_PER_UNIT;
use armory_core::{DomainError, DomainResult, Money, Quantity};

use crate::order::{OrderLineItem, StockItemSnapshot};

#[derive(Debug, Default, Clone, Copy)]
pub struct PricingEngine;

impl PricingEngine {
    /// Cost of `quantity` units of `item` at the snapshot's price and discount.
    pub fn price_line(item: &StockItemSnapshot, quantity: Quantity) -> DomainResult<Money> {
        let numerator = u128::from(item.unit_cost.minor_units())
            * u128::from(item.discount.payable_basis_points())
            * u128::from(quantity.get());
        let minor = round_half_even(numerator, u128::from(BASIS_POINTS_PER_UNIT));
        u64::try_from(minor)
            .map(Money::from_minor)
            .map_err(|_| DomainError::validation(format!("line cost overflow for item {}", item.item_id)))
    }

    /// Order total, recomputed from each line's snapshot.
    ///
    /// The `line_cost` stored on a line is ignored here so a tampered or stale
    /// value can never leak into a total.
    pub fn price_order(lines: &[OrderLineItem]) -> DomainResult<Money> {
        lines.iter().try_fold(Money::ZERO, |total, line| {
            let cost = Self::price_line(&line.item, line.quantity)?;
            total
                .checked_add(cost)
                .ok_or_else(|| DomainError::validation("order total overflow"))
        })
    }
}

fn round_half_even(numerator: u128, denominator: u128) -> u128 {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    match (remainder * 2).cmp(&denominator) {
        core::cmp::Ordering::Less => quotient,
        core::cmp::Ordering::Greater => quotient + 1,
        core::cmp::Ordering::Equal => quotient + (quotient % 2),
    }
}
