use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use armory_core::{Entity, Quantity, StockItemId, UserId};

/// One line of a cart. Unique by `item_id` within a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    pub item_id: StockItemId,
    pub quantity: Quantity,
}

impl CartEntry {
    pub fn new(item_id: StockItemId, quantity: Quantity) -> Self {
        Self { item_id, quantity }
    }
}

/// A requested addition, as received from the caller (not yet validated).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    pub item_id: StockItemId,
    pub quantity: i64,
}

impl Contribution {
    pub fn new(item_id: StockItemId, quantity: i64) -> Self {
        Self { item_id, quantity }
    }
}

/// A user's cart (exactly one per user).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    owner: UserId,
    entries: Vec<CartEntry>,
    updated_at: DateTime<Utc>,
}

impl Cart {
    /// The cart a user has before their first interaction.
    pub fn empty(owner: UserId, now: DateTime<Utc>) -> Self {
        Self {
            owner,
            entries: Vec::new(),
            updated_at: now,
        }
    }

    /// Rehydrate from storage.
    pub fn from_parts(owner: UserId, entries: Vec<CartEntry>, updated_at: DateTime<Utc>) -> Self {
        Self {
            owner,
            entries,
            updated_at,
        }
    }

    pub fn owner(&self) -> UserId {
        self.owner
    }

    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn quantity_of(&self, item_id: StockItemId) -> Option<Quantity> {
        self.entries
            .iter()
            .find(|e| e.item_id == item_id)
            .map(|e| e.quantity)
    }

    /// Swap in a new entry sequence produced by [`crate::CartAggregator`].
    pub fn replace_entries(&mut self, entries: Vec<CartEntry>, at: DateTime<Utc>) {
        self.entries = entries;
        self.updated_at = at;
    }
}

impl Entity for Cart {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.owner
    }
}
