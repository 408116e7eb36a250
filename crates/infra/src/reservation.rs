//! Inventory reservation: all-or-nothing stock decrements across order lines.
//!
//! ```text
//! requests
//!   ↓
//! 1. Read every item (missing -> ItemNotFound)
//!   ↓
//! 2. Check requested <= stock for each item (short -> InsufficientStock)
//!   ↓
//! 3. Snapshot + price the lines from the same read
//!   ↓
//! 4. Commit all decrements, each guarded by the version read in 1
//!      Conflict -> back to 1 (bounded by max_attempts)
//! ```
//!
//! Nothing is written until step 4, and step 4 writes every line or none.

use tracing::{debug, instrument, warn};

use armory_catalog::StockItem;
use armory_core::{DomainError, ExpectedVersion, Quantity, StockItemId};
use armory_ordering::{OrderLineItem, PricingEngine, StockItemSnapshot};

use crate::error::ServiceError;
use crate::store::{CatalogStore, StockDecrement, StoreError};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// One requested line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservationRequest {
    pub item_id: StockItemId,
    pub quantity: Quantity,
}

impl ReservationRequest {
    pub fn new(item_id: StockItemId, quantity: Quantity) -> Self {
        Self { item_id, quantity }
    }

    /// Validate a raw quantity; zero or negative fails with `InvalidQuantity`.
    pub fn from_raw(item_id: StockItemId, quantity: i64) -> Result<Self, DomainError> {
        Ok(Self::new(item_id, Quantity::for_item(item_id, quantity)?))
    }
}

#[derive(Debug, Clone)]
pub struct InventoryReservation<C> {
    catalog: C,
    max_attempts: u32,
}

impl<C> InventoryReservation<C>
where
    C: CatalogStore,
{
    pub fn new(catalog: C) -> Self {
        Self {
            catalog,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Attempts per reservation before giving up with `ReservationConflict`.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Reserve stock for every request, or for none.
    ///
    /// Returns one priced line per request, in request order. Lines for the
    /// same item are checked and decremented against their combined quantity.
    #[instrument(skip(self, requests), fields(lines = requests.len()), err)]
    pub async fn reserve(
        &self,
        requests: &[ReservationRequest],
    ) -> Result<Vec<OrderLineItem>, ServiceError> {
        if requests.is_empty() {
            return Err(DomainError::EmptyOrder.into());
        }
        let totals = combine(requests);

        for attempt in 1..=self.max_attempts {
            let items = self.read_items(&totals).await?;

            let mut decrements = Vec::with_capacity(totals.len());
            for ((item_id, requested), item) in totals.iter().zip(&items) {
                item.ensure_available(*requested)?;
                decrements.push(StockDecrement {
                    item_id: *item_id,
                    expected_version: ExpectedVersion::of(item),
                    // ensure_available bounds requested by a u32 stock
                    quantity: *requested as u32,
                });
            }

            let lines = requests
                .iter()
                .map(|r| {
                    let item = totals
                        .iter()
                        .position(|(id, _)| *id == r.item_id)
                        .map(|i| &items[i])
                        .ok_or(DomainError::ItemNotFound(r.item_id))?;
                    OrderLineItem::priced(StockItemSnapshot::from(item), r.quantity)
                })
                .collect::<Result<Vec<_>, DomainError>>()?;
            // Reject totals that cannot be represented before any stock moves.
            PricingEngine::price_order(&lines)?;

            match self.catalog.commit_decrements(&decrements).await {
                Ok(_) => {
                    debug!(attempt, "stock reserved");
                    return Ok(lines);
                }
                Err(StoreError::Conflict(reason)) => {
                    warn!(attempt, max_attempts = self.max_attempts, %reason, "reservation conflict, retrying from a fresh read");
                }
                Err(other) => return Err(other.into()),
            }
        }

        Err(ServiceError::ReservationConflict {
            attempts: self.max_attempts,
        })
    }

    async fn read_items(&self, totals: &[(StockItemId, u64)]) -> Result<Vec<StockItem>, ServiceError> {
        let mut items = Vec::with_capacity(totals.len());
        for (item_id, _) in totals {
            let item = self
                .catalog
                .get(*item_id)
                .await?
                .ok_or(DomainError::ItemNotFound(*item_id))?;
            items.push(item);
        }
        Ok(items)
    }
}

/// Sum requested quantities per item, keeping first-seen order.
fn combine(requests: &[ReservationRequest]) -> Vec<(StockItemId, u64)> {
    let mut totals: Vec<(StockItemId, u64)> = Vec::with_capacity(requests.len());
    for r in requests {
        let q = u64::from(r.quantity.get());
        match totals.iter_mut().find(|(id, _)| *id == r.item_id) {
            Some((_, total)) => *total += q,
            None => totals.push((r.item_id, q)),
        }
    }
    totals
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Arc;

    use armory_catalog::{Category, Creator, Manufacturer, StockItemDetails, Tier};
    use armory_core::{AggregateRoot, Discount, ErrorKind, Money, UserId};

    use crate::store::InMemoryCatalogStore;

    pub(crate) fn armor(stock: u32, unit_cost_minor: u64, discount_bp: u16) -> StockItem {
        StockItem::new(
            StockItemId::new(),
            StockItemDetails {
                name: "Adrax breastplate".to_string(),
                description: "Heavy plated torso armor.".to_string(),
                category: Category::Body,
                unit_cost: Money::from_minor(unit_cost_minor),
                protection: Tier::High,
                quality: Tier::Medium,
                shield: 0,
                discount: Discount::from_basis_points(discount_bp).unwrap(),
                manufacturer: Manufacturer::AdraxCorp,
                created_by: Creator {
                    user_id: UserId::new(),
                    user_name: "Freddy".to_string(),
                },
            },
            stock,
        )
    }

    fn request(item: &StockItem, q: i64) -> ReservationRequest {
        ReservationRequest::from_raw(item.id_typed(), q).unwrap()
    }

    #[tokio::test]
    async fn reserves_and_prices_each_line() {
        let a = armor(5, 10_000, 1_000);
        let catalog = Arc::new(InMemoryCatalogStore::with_items([a.clone()]));
        let reservation = InventoryReservation::new(catalog.clone());

        let lines = reservation.reserve(&[request(&a, 3)]).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].line_cost, Money::from_major(270).unwrap());

        let after = catalog.get(a.id_typed()).await.unwrap().unwrap();
        assert_eq!(after.stock(), 2);
        assert_eq!(after.version(), 1);
    }

    #[tokio::test]
    async fn unknown_item_fails_before_any_decrement() {
        let a = armor(5, 100, 0);
        let catalog = Arc::new(InMemoryCatalogStore::with_items([a.clone()]));
        let reservation = InventoryReservation::new(catalog.clone());
        let missing = StockItemId::new();

        let err = reservation
            .reserve(&[request(&a, 1), ReservationRequest::from_raw(missing, 1).unwrap()])
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::ItemNotFound(id)) if id == missing));
        assert_eq!(catalog.get(a.id_typed()).await.unwrap().unwrap().stock(), 5);
    }

    #[tokio::test]
    async fn insufficient_line_leaves_every_item_unchanged() {
        let (a, b) = (armor(10, 100, 0), armor(1, 100, 0));
        let catalog = Arc::new(InMemoryCatalogStore::with_items([a.clone(), b.clone()]));
        let reservation = InventoryReservation::new(catalog.clone());

        let err = reservation
            .reserve(&[request(&a, 1), request(&b, 2)])
            .await
            .unwrap_err();
        match err {
            ServiceError::Domain(DomainError::InsufficientStock {
                item_id,
                available,
                requested,
            }) => {
                assert_eq!(item_id, b.id_typed());
                assert_eq!((available, requested), (1, 2));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(catalog.get(a.id_typed()).await.unwrap().unwrap().stock(), 10);
        assert_eq!(catalog.get(b.id_typed()).await.unwrap().unwrap().stock(), 1);
    }

    #[tokio::test]
    async fn repeated_item_is_checked_against_combined_quantity() {
        let a = armor(3, 100, 0);
        let catalog = Arc::new(InMemoryCatalogStore::with_items([a.clone()]));
        let reservation = InventoryReservation::new(catalog.clone());

        let err = reservation
            .reserve(&[request(&a, 2), request(&a, 2)])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientStock);

        let lines = reservation.reserve(&[request(&a, 1), request(&a, 2)]).await.unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(catalog.get(a.id_typed()).await.unwrap().unwrap().stock(), 0);
    }

    #[tokio::test]
    async fn non_positive_quantity_is_rejected_up_front() {
        let err = ReservationRequest::from_raw(StockItemId::new(), 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidQuantity);
        let err = ReservationRequest::from_raw(StockItemId::new(), -4).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidQuantity);
    }

    #[tokio::test]
    async fn empty_request_is_an_empty_order() {
        let reservation = InventoryReservation::new(Arc::new(InMemoryCatalogStore::new()));
        let err = reservation.reserve(&[]).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyOrder);
    }

    #[test]
    fn max_attempts_is_at_least_one() {
        let reservation =
            InventoryReservation::new(Arc::new(InMemoryCatalogStore::new())).with_max_attempts(0);
        assert_eq!(reservation.max_attempts(), 1);
    }
}
