//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Carts are identified by their owner, orders by their own id; both are
/// compared by identity rather than by contents.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
