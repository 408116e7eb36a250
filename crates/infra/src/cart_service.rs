use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, instrument};

use armory_cart::{Cart, CartAggregator, Contribution};
use armory_core::{DomainError, StockItemId, UserId};

use crate::error::ServiceError;
use crate::locks::UserLocks;
use crate::store::{CartStore, CatalogStore};

/// Server-side cart operations for one caller at a time.
#[derive(Debug)]
pub struct CartService<C, K> {
    catalog: C,
    carts: K,
    locks: Arc<UserLocks>,
}

impl<C, K> CartService<C, K>
where
    C: CatalogStore,
    K: CartStore,
{
    pub fn new(catalog: C, carts: K, locks: Arc<UserLocks>) -> Self {
        Self {
            catalog,
            carts,
            locks,
        }
    }

    /// The caller's cart; an empty one if they never added anything.
    #[instrument(skip(self), fields(user = %user), err)]
    pub async fn view(&self, user: UserId) -> Result<Cart, ServiceError> {
        Ok(self
            .carts
            .find(user)
            .await?
            .unwrap_or_else(|| Cart::empty(user, Utc::now())))
    }

    /// Merge `contributions` into the caller's cart.
    ///
    /// Quantities are validated before any item lookup, and every item must
    /// exist in the catalog. Nothing is stored unless the whole batch passes.
    #[instrument(skip(self, contributions), fields(user = %user, contributions = contributions.len()), err)]
    pub async fn add(&self, user: UserId, contributions: &[Contribution]) -> Result<Cart, ServiceError> {
        if contributions.is_empty() {
            return Err(DomainError::validation("no items to add").into());
        }

        let _guard = self.locks.acquire(user).await;
        let mut cart = self.view(user).await?;
        let merged = CartAggregator::merge(cart.entries(), contributions)?;

        let mut checked: Vec<StockItemId> = Vec::with_capacity(contributions.len());
        for c in contributions {
            if checked.contains(&c.item_id) {
                continue;
            }
            if self.catalog.get(c.item_id).await?.is_none() {
                return Err(DomainError::ItemNotFound(c.item_id).into());
            }
            checked.push(c.item_id);
        }

        cart.replace_entries(merged, Utc::now());
        self.carts.upsert(&cart).await?;
        debug!(entries = cart.entries().len(), "cart updated");
        Ok(cart)
    }

    /// Remove `item_id` from the caller's cart. Absent items are not an error.
    #[instrument(skip(self), fields(user = %user, item_id = %item_id), err)]
    pub async fn remove(&self, user: UserId, item_id: StockItemId) -> Result<Cart, ServiceError> {
        let _guard = self.locks.acquire(user).await;
        let mut cart = self.view(user).await?;
        if cart.quantity_of(item_id).is_none() {
            return Ok(cart);
        }
        let remaining = CartAggregator::delete_entry(cart.entries(), item_id);
        cart.replace_entries(remaining, Utc::now());
        self.carts.upsert(&cart).await?;
        Ok(cart)
    }
}
