//! `armory-core`: shared building blocks for the checkout domain.
//!
//! Pure types only: identifiers, money, quantities, optimistic versioning and
//! the domain error model. No IO.

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod value_object;

pub use aggregate::{AggregateRoot, ExpectedVersion};
pub use entity::Entity;
pub use error::{DomainError, DomainResult, ErrorKind};
pub use id::{OrderId, StockItemId, UserId};
pub use money::{Discount, Money, Quantity};
pub use value_object::ValueObject;
