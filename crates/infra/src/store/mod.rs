//! Storage boundary for stock items, carts and orders.
//!
//! The traits make no storage assumptions: the in-memory implementations back
//! tests and local runs, the Postgres ones back deployments.

pub mod in_memory;
pub mod postgres;
pub mod query;
pub mod r#trait;

pub use in_memory::{InMemoryCartStore, InMemoryCatalogStore, InMemoryOrderStore};
pub use postgres::{ensure_schema, PostgresCartStore, PostgresCatalogStore, PostgresOrderStore};
pub use query::{Page, Pagination};
pub use r#trait::{CartStore, CatalogStore, OrderStore, StockDecrement, StoreError};
