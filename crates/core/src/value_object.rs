//! Value object trait: equality by value, not identity.
//!
//! Value objects have no identity; two instances with the same attributes are
//! interchangeable. In this workspace that covers money, discounts, quantities
//! and the frozen stock item snapshots carried by orders.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// build a new one.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Money(u64);
///
/// impl ValueObject for Money {}
///
/// assert_eq!(Money(100), Money(100));
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
