//! Cart domain module: per-user working set of desired items.
//!
//! Deterministic domain logic only. Loading and saving carts is the caller's
//! job (see `armory-infra`).

pub mod aggregator;
pub mod cart;

pub use aggregator::CartAggregator;
pub use cart::{Cart, CartEntry, Contribution};
