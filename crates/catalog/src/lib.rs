//! Catalog domain module: stock items ("armor") and their on-hand quantity.
//!
//! Pure domain logic (no IO, no HTTP, no storage). Catalog-managed attributes
//! are read-only from the checkout's point of view; only the stock quantity is
//! mutated, and only through a versioned decrement.

pub mod stock_item;

pub use stock_item::{Category, Creator, Manufacturer, StockItem, StockItemDetails, Tier};
