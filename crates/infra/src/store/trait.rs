use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use armory_cart::Cart;
use armory_catalog::StockItem;
use armory_core::{ExpectedVersion, OrderId, StockItemId, UserId};
use armory_ordering::Order;

use super::query::{Page, Pagination};

/// Store operation error.
///
/// These are **infrastructure errors** (storage, concurrency) as opposed to
/// domain errors (validation, stock limits).
#[derive(Debug, Error)]
pub enum StoreError {
    /// A versioned write found a different version than expected.
    #[error("optimistic concurrency check failed: {0}")]
    Conflict(String),

    /// A record with the same key already exists.
    #[error("duplicate record: {0}")]
    Duplicate(String),

    /// A stored document could not be decoded into its domain type.
    #[error("corrupt stored record: {0}")]
    Corrupt(String),

    /// Connection, transaction or other backend failure.
    #[error("storage backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict(_))
    }
}

/// One guarded stock decrement inside a reservation batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockDecrement {
    pub item_id: StockItemId,
    /// Version the item was read at.
    pub expected_version: ExpectedVersion,
    pub quantity: u32,
}

/// Stock item storage.
///
/// `commit_decrements` is the only way stock changes after insertion.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn get(&self, id: StockItemId) -> Result<Option<StockItem>, StoreError>;

    async fn list(&self, pagination: Pagination) -> Result<Page<StockItem>, StoreError>;

    /// Add a new item. Fails with `Duplicate` if the id is taken.
    async fn insert(&self, item: StockItem) -> Result<(), StoreError>;

    /// Apply every decrement or none of them.
    ///
    /// Implementations must:
    /// - check each item's current version against `expected_version`
    /// - reject the whole batch with `Conflict` on any mismatch, on a missing
    ///   item, or when a decrement would take stock below zero
    /// - bump the version of every decremented item by one
    /// - take per-item locks in item id order, never batch order
    ///
    /// Each item appears at most once per batch. Returns the updated items in
    /// batch order.
    async fn commit_decrements(
        &self,
        decrements: &[StockDecrement],
    ) -> Result<Vec<StockItem>, StoreError>;
}

/// Cart storage, one cart per user.
#[async_trait]
pub trait CartStore: Send + Sync {
    async fn find(&self, owner: UserId) -> Result<Option<Cart>, StoreError>;

    async fn upsert(&self, cart: &Cart) -> Result<(), StoreError>;
}

/// Order storage. Orders are write-once: there is no update or delete.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist a new order. Fails with `Duplicate` if the id is taken.
    async fn create(&self, order: &Order) -> Result<(), StoreError>;

    async fn find(&self, id: OrderId) -> Result<Option<Order>, StoreError>;

    /// The owner's orders, newest first.
    async fn list_for_owner(
        &self,
        owner: UserId,
        pagination: Pagination,
    ) -> Result<Page<Order>, StoreError>;
}

#[async_trait]
impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    async fn get(&self, id: StockItemId) -> Result<Option<StockItem>, StoreError> {
        (**self).get(id).await
    }

    async fn list(&self, pagination: Pagination) -> Result<Page<StockItem>, StoreError> {
        (**self).list(pagination).await
    }

    async fn insert(&self, item: StockItem) -> Result<(), StoreError> {
        (**self).insert(item).await
    }

    async fn commit_decrements(
        &self,
        decrements: &[StockDecrement],
    ) -> Result<Vec<StockItem>, StoreError> {
        (**self).commit_decrements(decrements).await
    }
}

#[async_trait]
impl<S> CartStore for Arc<S>
where
    S: CartStore + ?Sized,
{
    async fn find(&self, owner: UserId) -> Result<Option<Cart>, StoreError> {
        (**self).find(owner).await
    }

    async fn upsert(&self, cart: &Cart) -> Result<(), StoreError> {
        (**self).upsert(cart).await
    }
}

#[async_trait]
impl<S> OrderStore for Arc<S>
where
    S: OrderStore + ?Sized,
{
    async fn create(&self, order: &Order) -> Result<(), StoreError> {
        (**self).create(order).await
    }

    async fn find(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        (**self).find(id).await
    }

    async fn list_for_owner(
        &self,
        owner: UserId,
        pagination: Pagination,
    ) -> Result<Page<Order>, StoreError> {
        (**self).list_for_owner(owner, pagination).await
    }
}
