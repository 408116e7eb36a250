//! Versioned aggregate roots and optimistic concurrency expectations.

/// Aggregate root marker + minimal interface.
///
/// Anything whose state is shared between concurrent writers (stock items in
/// particular) exposes a monotonically increasing version so stores can reject
/// writes computed from stale reads.
pub trait AggregateRoot {
    /// Strongly-typed aggregate identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the aggregate identifier.
    fn id(&self) -> &Self::Id;

    /// Monotonically increasing version of the aggregate's state.
    ///
    /// Bumped by exactly one on every committed mutation.
    fn version(&self) -> u64;
}

/// Optimistic concurrency expectation: the version an aggregate must still be
/// at for a write to apply.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ExpectedVersion(u64);

impl ExpectedVersion {
    pub const fn exact(version: u64) -> Self {
        Self(version)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    pub fn matches(self, actual: u64) -> bool {
        self.0 == actual
    }

    /// Expectation pinned to the version an aggregate was read at.
    pub fn of<A: AggregateRoot>(aggregate: &A) -> Self {
        Self(aggregate.version())
    }
}
