//! Ordering domain module: immutable orders and authoritative pricing.
//!
//! Deterministic domain logic (no IO, no HTTP, no storage). Order totals are
//! always computed here from frozen catalog snapshots, never accepted from a
//! caller.

pub mod order;
pub mod pricing;

pub use order::{Order, OrderLineItem, PlacementStage, StockItemSnapshot};
pub use pricing::PricingEngine;
