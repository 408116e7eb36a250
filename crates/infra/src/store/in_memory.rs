use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;

use armory_cart::Cart;
use armory_catalog::StockItem;
use armory_core::{AggregateRoot, OrderId, StockItemId, UserId};
use armory_ordering::Order;

use super::query::{Page, Pagination};
use super::r#trait::{CartStore, CatalogStore, OrderStore, StockDecrement, StoreError};

fn poisoned() -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

/// In-memory catalog.
///
/// Intended for tests/dev. Items list newest first (ids are time-ordered).
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    items: RwLock<BTreeMap<StockItemId, StockItem>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: impl IntoIterator<Item = StockItem>) -> Self {
        Self {
            items: RwLock::new(items.into_iter().map(|i| (i.id_typed(), i)).collect()),
        }
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn get(&self, id: StockItemId) -> Result<Option<StockItem>, StoreError> {
        let items = self.items.read().map_err(|_| poisoned())?;
        Ok(items.get(&id).cloned())
    }

    async fn list(&self, pagination: Pagination) -> Result<Page<StockItem>, StoreError> {
        let items = self.items.read().map_err(|_| poisoned())?;
        let all: Vec<&StockItem> = items.values().rev().collect();
        let window = pagination.window(&all).into_iter().cloned().collect();
        Ok(Page::new(window, all.len() as u64, pagination))
    }

    async fn insert(&self, item: StockItem) -> Result<(), StoreError> {
        let mut items = self.items.write().map_err(|_| poisoned())?;
        let id = item.id_typed();
        if items.contains_key(&id) {
            return Err(StoreError::Duplicate(format!("stock item {id}")));
        }
        items.insert(id, item);
        Ok(())
    }

    async fn commit_decrements(
        &self,
        decrements: &[StockDecrement],
    ) -> Result<Vec<StockItem>, StoreError> {
        let mut items = self.items.write().map_err(|_| poisoned())?;

        // Stage every change first; nothing is written unless all of them pass.
        let mut staged: HashMap<StockItemId, StockItem> = HashMap::with_capacity(decrements.len());
        let mut updated = Vec::with_capacity(decrements.len());
        for d in decrements {
            let current = staged
                .get(&d.item_id)
                .or_else(|| items.get(&d.item_id))
                .ok_or_else(|| StoreError::Conflict(format!("stock item {} no longer exists", d.item_id)))?;

            if !d.expected_version.matches(current.version()) {
                return Err(StoreError::Conflict(format!(
                    "stock item {}: expected {:?}, found {}",
                    d.item_id,
                    d.expected_version,
                    current.version()
                )));
            }

            let next = current
                .decremented(u64::from(d.quantity))
                .map_err(|e| StoreError::Conflict(e.to_string()))?;
            updated.push(next.clone());
            staged.insert(d.item_id, next);
        }

        items.extend(staged);
        Ok(updated)
    }
}

/// In-memory cart storage keyed by owner.
#[derive(Debug, Default)]
pub struct InMemoryCartStore {
    carts: RwLock<HashMap<UserId, Cart>>,
}

impl InMemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn find(&self, owner: UserId) -> Result<Option<Cart>, StoreError> {
        let carts = self.carts.read().map_err(|_| poisoned())?;
        Ok(carts.get(&owner).cloned())
    }

    async fn upsert(&self, cart: &Cart) -> Result<(), StoreError> {
        let mut carts = self.carts.write().map_err(|_| poisoned())?;
        carts.insert(cart.owner(), cart.clone());
        Ok(())
    }
}

/// In-memory, write-once order storage.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    orders: RwLock<HashMap<OrderId, Order>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.orders.read().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create(&self, order: &Order) -> Result<(), StoreError> {
        let mut orders = self.orders.write().map_err(|_| poisoned())?;
        let id = order.id_typed();
        if orders.contains_key(&id) {
            return Err(StoreError::Duplicate(format!("order {id}")));
        }
        orders.insert(id, order.clone());
        Ok(())
    }

    async fn find(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let orders = self.orders.read().map_err(|_| poisoned())?;
        Ok(orders.get(&id).cloned())
    }

    async fn list_for_owner(
        &self,
        owner: UserId,
        pagination: Pagination,
    ) -> Result<Page<Order>, StoreError> {
        let orders = self.orders.read().map_err(|_| poisoned())?;
        let mut owned: Vec<&Order> = orders.values().filter(|o| o.owner() == owner).collect();
        owned.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id_typed().cmp(&a.id_typed()))
        });
        let window = pagination.window(&owned).into_iter().cloned().collect();
        Ok(Page::new(window, owned.len() as u64, pagination))
    }
}
