//! Cart merging rules.
//!
//! ```text
//! current:  [{A,2}, {B,1}]
//! incoming: [{C,4}, {A,3}]
//! result:   [{A,5}, {B,1}, {C,4}]
//! ```
//!
//! Existing entries keep their position, new items are appended in the order
//! they were contributed, and an item never appears twice.

use armory_core::{DomainResult, Quantity, StockItemId};

use crate::cart::{CartEntry, Contribution};

/// Stateless merge/delete/clear operations over cart entry sequences.
#[derive(Debug, Default, Clone, Copy)]
pub struct CartAggregator;

impl CartAggregator {
    /// Merge incoming contributions into `current`.
    ///
    /// All contributions are validated before anything is merged: one
    /// non-positive quantity rejects the whole batch with `InvalidQuantity`.
    pub fn merge(current: &[CartEntry], incoming: &[Contribution]) -> DomainResult<Vec<CartEntry>> {
        let validated = incoming
            .iter()
            .map(|c| Quantity::for_item(c.item_id, c.quantity).map(|q| CartEntry::new(c.item_id, q)))
            .collect::<DomainResult<Vec<_>>>()?;

        let mut merged = current.to_vec();
        for entry in validated {
            match merged.iter_mut().find(|e| e.item_id == entry.item_id) {
                Some(existing) => existing.quantity = existing.quantity.checked_add(entry.quantity)?,
                None => merged.push(entry),
            }
        }
        Ok(merged)
    }

    /// Remove the entry for `item_id`. Absent ids leave the sequence unchanged.
    pub fn delete_entry(entries: &[CartEntry], item_id: StockItemId) -> Vec<CartEntry> {
        let mut remaining = entries.to_vec();
        if let Some(pos) = remaining.iter().position(|e| e.item_id == item_id) {
            remaining.remove(pos);
        }
        remaining
    }

    pub fn clear() -> Vec<CartEntry> {
        Vec::new()
    }
}
