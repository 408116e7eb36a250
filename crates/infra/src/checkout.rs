//! Order placement (application-level orchestration).
//!
//! ```text
//! cart entries
//!   ↓
//! Validating    empty -> EmptyOrder
//!   ↓
//! Reserving     InventoryReservation (all-or-nothing)
//!   ↓
//! Pricing       Order total from the frozen snapshots
//!   ↓
//! Persisting    OrderStore::create
//!   ↓
//! ClearingCart  CartStore::upsert(empty cart)
//!   ↓
//! Done
//! ```
//!
//! Failures before `Persisting` leave every store untouched. Failures from
//! `Persisting` on surface as `StorageFailure`; the reserved stock stays
//! decremented.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, instrument};

use armory_cart::{Cart, CartEntry};
use armory_core::{DomainError, OrderId, UserId};
use armory_ordering::{Order, PlacementStage};

use crate::error::ServiceError;
use crate::locks::UserLocks;
use crate::reservation::{InventoryReservation, ReservationRequest};
use crate::store::{CartStore, CatalogStore, OrderStore, StoreError};

/// Turns a user's cart into a persisted order.
#[derive(Debug)]
pub struct OrderAssembler<C, K, O> {
    reservation: InventoryReservation<C>,
    carts: K,
    orders: O,
    locks: Arc<UserLocks>,
}

impl<C, K, O> OrderAssembler<C, K, O>
where
    C: CatalogStore,
    K: CartStore,
    O: OrderStore,
{
    /// `locks` must be the table shared with the cart service so checkout and
    /// cart edits for one user never interleave.
    pub fn new(reservation: InventoryReservation<C>, carts: K, orders: O, locks: Arc<UserLocks>) -> Self {
        Self {
            reservation,
            carts,
            orders,
            locks,
        }
    }

    /// Check out the caller's stored cart.
    #[instrument(skip(self), fields(user = %user), err)]
    pub async fn checkout(&self, user: UserId) -> Result<Order, ServiceError> {
        let _guard = self.locks.acquire(user).await;
        let entries = self
            .carts
            .find(user)
            .await?
            .map(|cart| cart.entries().to_vec())
            .unwrap_or_default();
        self.place_order(user, &entries, Utc::now()).await
    }

    /// Place an order for `entries` on behalf of `user`.
    ///
    /// Does not take the user lock; [`OrderAssembler::checkout`] does.
    #[instrument(skip(self, entries), fields(user = %user, lines = entries.len()), err)]
    pub async fn place_order(
        &self,
        user: UserId,
        entries: &[CartEntry],
        placed_at: DateTime<Utc>,
    ) -> Result<Order, ServiceError> {
        stage(PlacementStage::Validating);
        if entries.is_empty() {
            return Err(DomainError::EmptyOrder.into());
        }
        let requests: Vec<ReservationRequest> = entries
            .iter()
            .map(|e| ReservationRequest::new(e.item_id, e.quantity))
            .collect();

        stage(PlacementStage::Reserving);
        let lines = self.reservation.reserve(&requests).await?;

        stage(PlacementStage::Pricing);
        // reserve() already priced these lines, so this cannot fail on arithmetic
        let order = Order::place(OrderId::new(), user, lines, placed_at)?;

        stage(PlacementStage::Persisting);
        self.orders
            .create(&order)
            .await
            .map_err(|e| after_reservation(PlacementStage::Persisting, order.id_typed(), e))?;

        stage(PlacementStage::ClearingCart);
        self.carts
            .upsert(&Cart::empty(user, placed_at))
            .await
            .map_err(|e| after_reservation(PlacementStage::ClearingCart, order.id_typed(), e))?;

        stage(PlacementStage::Done);
        info!(
            order_id = %order.id_typed(),
            total_cost = %order.total_cost(),
            lines = order.lines().len(),
            "order placed"
        );
        Ok(order)
    }
}

fn stage(stage: PlacementStage) {
    debug!(%stage, "order placement stage");
}

fn after_reservation(stage: PlacementStage, order_id: OrderId, source: StoreError) -> ServiceError {
    error!(%stage, %order_id, error = %source, "storage failed after stock was reserved");
    ServiceError::Placement { stage, source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use armory_core::{ErrorKind, Money, Quantity};

    use crate::reservation::tests::armor;
    use crate::store::{
        InMemoryCartStore, InMemoryCatalogStore, InMemoryOrderStore, Page, Pagination,
    };

    type Assembler = OrderAssembler<
        Arc<InMemoryCatalogStore>,
        Arc<InMemoryCartStore>,
        Arc<dyn OrderStore>,
    >;

    /// Order store whose writes always fail.
    struct FailingOrderStore;

    #[async_trait]
    impl OrderStore for FailingOrderStore {
        async fn create(&self, _order: &Order) -> Result<(), StoreError> {
            Err(StoreError::Backend("disk full".to_string()))
        }

        async fn find(&self, _id: OrderId) -> Result<Option<Order>, StoreError> {
            Ok(None)
        }

        async fn list_for_owner(
            &self,
            _owner: UserId,
            pagination: Pagination,
        ) -> Result<Page<Order>, StoreError> {
            Ok(Page::new(vec![], 0, pagination))
        }
    }

    fn assembler(
        catalog: Arc<InMemoryCatalogStore>,
        carts: Arc<InMemoryCartStore>,
        orders: Arc<dyn OrderStore>,
    ) -> Assembler {
        OrderAssembler::new(
            InventoryReservation::new(catalog),
            carts,
            orders,
            Arc::new(UserLocks::new()),
        )
    }

    fn entry(item: &armory_catalog::StockItem, q: i64) -> CartEntry {
        CartEntry::new(item.id_typed(), Quantity::new(q).unwrap())
    }

    #[tokio::test]
    async fn empty_entries_fail_without_touching_stores() {
        let orders = Arc::new(InMemoryOrderStore::new());
        let checkout = assembler(
            Arc::new(InMemoryCatalogStore::new()),
            Arc::new(InMemoryCartStore::new()),
            orders.clone(),
        );
        let err = checkout.place_order(UserId::new(), &[], Utc::now()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyOrder);
        assert!(orders.is_empty());
    }

    #[tokio::test]
    async fn insufficient_stock_persists_nothing() {
        let a = armor(1, 500, 0);
        let catalog = Arc::new(InMemoryCatalogStore::with_items([a.clone()]));
        let carts = Arc::new(InMemoryCartStore::new());
        let orders = Arc::new(InMemoryOrderStore::new());
        let user = UserId::new();
        carts
            .upsert(&Cart::from_parts(user, vec![entry(&a, 2)], Utc::now()))
            .await
            .unwrap();

        let checkout = assembler(catalog.clone(), carts.clone(), orders.clone());
        let err = checkout.checkout(user).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientStock);

        assert!(orders.is_empty());
        assert_eq!(carts.find(user).await.unwrap().unwrap().entries().len(), 1);
        assert_eq!(catalog.get(a.id_typed()).await.unwrap().unwrap().stock(), 1);
    }

    #[tokio::test]
    async fn persistence_failure_after_reservation_is_a_storage_failure() {
        let a = armor(5, 500, 0);
        let catalog = Arc::new(InMemoryCatalogStore::with_items([a.clone()]));
        let carts = Arc::new(InMemoryCartStore::new());
        let user = UserId::new();
        carts
            .upsert(&Cart::from_parts(user, vec![entry(&a, 2)], Utc::now()))
            .await
            .unwrap();

        let checkout = assembler(catalog.clone(), carts.clone(), Arc::new(FailingOrderStore));
        let err = checkout.checkout(user).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StorageFailure);
        assert!(matches!(
            err,
            ServiceError::Placement {
                stage: PlacementStage::Persisting,
                ..
            }
        ));

        // No compensation: stock stays reserved, cart is kept.
        assert_eq!(catalog.get(a.id_typed()).await.unwrap().unwrap().stock(), 3);
        assert_eq!(carts.find(user).await.unwrap().unwrap().entries().len(), 1);
    }

    #[tokio::test]
    async fn order_total_uses_catalog_prices() {
        let (a, b) = (armor(5, 10_000, 1_000), armor(5, 999, 0));
        let catalog = Arc::new(InMemoryCatalogStore::with_items([a.clone(), b.clone()]));
        let checkout = assembler(
            catalog,
            Arc::new(InMemoryCartStore::new()),
            Arc::new(InMemoryOrderStore::new()),
        );

        let order = checkout
            .place_order(UserId::new(), &[entry(&a, 3), entry(&b, 1)], Utc::now())
            .await
            .unwrap();
        assert_eq!(order.total_cost(), Money::from_minor(27_000 + 999));
        assert_eq!(order.lines()[0].item.item_id, a.id_typed());
        assert_eq!(order.lines()[1].item.item_id, b.id_typed());
    }
}
