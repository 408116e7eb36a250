use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use armory_catalog::{Category, Manufacturer, StockItem, Tier};
use armory_core::{
    Discount, DomainError, DomainResult, Entity, Money, OrderId, Quantity, StockItemId, UserId,
    ValueObject,
};

use crate::pricing::PricingEngine;

/// Frozen copy of the order-relevant stock item fields.
///
/// Taken at reservation time so later catalog edits never change a placed
/// order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockItemSnapshot {
    pub item_id: StockItemId,
    pub name: String,
    pub category: Category,
    pub unit_cost: Money,
    pub discount: Discount,
    pub protection: Tier,
    pub quality: Tier,
    pub manufacturer: Manufacturer,
}

impl From<&StockItem> for StockItemSnapshot {
    fn from(item: &StockItem) -> Self {
        let d = item.details();
        Self {
            item_id: item.id_typed(),
            name: d.name.clone(),
            category: d.category,
            unit_cost: d.unit_cost,
            discount: d.discount,
            protection: d.protection,
            quality: d.quality,
            manufacturer: d.manufacturer,
        }
    }
}

impl ValueObject for StockItemSnapshot {}

/// Order line: snapshot, quantity, server-computed cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub item: StockItemSnapshot,
    pub quantity: Quantity,
    /// Cost in minor currency units, as computed by [`PricingEngine`].
    pub line_cost: Money,
}

impl OrderLineItem {
    pub fn priced(item: StockItemSnapshot, quantity: Quantity) -> DomainResult<Self> {
        let line_cost = PricingEngine::price_line(&item, quantity)?;
        Ok(Self {
            item,
            quantity,
            line_cost,
        })
    }

    pub fn item_id(&self) -> StockItemId {
        self.item.item_id
    }
}

/// Steps of a single order placement attempt, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementStage {
    Validating,
    Reserving,
    Pricing,
    Persisting,
    ClearingCart,
    Done,
}

impl PlacementStage {
    pub fn as_str(self) -> &'static str {
        match self {
            PlacementStage::Validating => "validating",
            PlacementStage::Reserving => "reserving",
            PlacementStage::Pricing => "pricing",
            PlacementStage::Persisting => "persisting",
            PlacementStage::ClearingCart => "clearing_cart",
            PlacementStage::Done => "done",
        }
    }
}

impl core::fmt::Display for PlacementStage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A placed order. No operation mutates it after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    owner: UserId,
    lines: Vec<OrderLineItem>,
    total_cost: Money,
    created_at: DateTime<Utc>,
}

impl Order {
    /// Build an order from reserved lines; the total is computed here.
    pub fn place(
        id: OrderId,
        owner: UserId,
        lines: Vec<OrderLineItem>,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if lines.is_empty() {
            return Err(DomainError::EmptyOrder);
        }
        let total_cost = PricingEngine::price_order(&lines)?;
        Ok(Self {
            id,
            owner,
            lines,
            total_cost,
            created_at,
        })
    }

    pub fn id_typed(&self) -> OrderId {
        self.id
    }

    pub fn owner(&self) -> UserId {
        self.owner
    }

    pub fn lines(&self) -> &[OrderLineItem] {
        &self.lines
    }

    pub fn total_cost(&self) -> Money {
        self.total_cost
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use armory_catalog::{Creator, StockItemDetails};

    fn stock_item(unit_cost_minor: u64, discount_bp: u16) -> StockItem {
        StockItem::new(
            StockItemId::new(),
            StockItemDetails {
                name: "Starscape visor".to_string(),
                description: "Polarised helmet visor.".to_string(),
                category: Category::Helmet,
                unit_cost: Money::from_minor(unit_cost_minor),
                protection: Tier::Low,
                quality: Tier::High,
                shield: 2,
                discount: Discount::from_basis_points(discount_bp).unwrap(),
                manufacturer: Manufacturer::StarscapeSystems,
                created_by: Creator {
                    user_id: UserId::new(),
                    user_name: "Freddy".to_string(),
                },
            },
            10,
        )
    }

    fn qty(q: i64) -> Quantity {
        Quantity::new(q).unwrap()
    }

    #[test]
    fn snapshot_copies_price_relevant_fields() {
        let item = stock_item(4_999, 500);
        let snap = StockItemSnapshot::from(&item);
        assert_eq!(snap.item_id, item.id_typed());
        assert_eq!(snap.unit_cost, item.details().unit_cost);
        assert_eq!(snap.discount, item.details().discount);
        assert_eq!(snap.name, item.details().name);
    }

    #[test]
    fn placing_an_order_computes_the_total() {
        let a = OrderLineItem::priced(StockItemSnapshot::from(&stock_item(5_000, 0)), qty(2)).unwrap();
        let b = OrderLineItem::priced(StockItemSnapshot::from(&stock_item(1_000, 1_000)), qty(1)).unwrap();
        assert_eq!(a.line_cost, Money::from_minor(10_000));
        assert_eq!(b.line_cost, Money::from_minor(900));

        let order = Order::place(OrderId::new(), UserId::new(), vec![a, b], Utc::now()).unwrap();
        assert_eq!(order.total_cost(), Money::from_minor(10_900));
        assert_eq!(order.lines().len(), 2);
    }

    #[test]
    fn empty_order_is_rejected() {
        let err = Order::place(OrderId::new(), UserId::new(), vec![], Utc::now()).unwrap_err();
        assert_eq!(err, DomainError::EmptyOrder);
    }

    #[test]
    fn snapshot_is_unaffected_by_later_catalog_changes() {
        let item = stock_item(2_000, 0);
        let line = OrderLineItem::priced(StockItemSnapshot::from(&item), qty(1)).unwrap();

        let mut edited = item.details().clone();
        edited.unit_cost = Money::from_minor(9_999);
        let _repriced = StockItem::from_parts(item.id_typed(), edited, item.stock(), 1);

        assert_eq!(line.item.unit_cost, Money::from_minor(2_000));
        assert_eq!(line.line_cost, Money::from_minor(2_000));
    }

    #[test]
    fn order_survives_json_storage() {
        let line = OrderLineItem::priced(StockItemSnapshot::from(&stock_item(3_000, 2_500)), qty(4)).unwrap();
        let order = Order::place(OrderId::new(), UserId::new(), vec![line], Utc::now()).unwrap();
        let stored = serde_json::to_value(&order).unwrap();
        assert_eq!(stored["total_cost"], 9_000);
        let loaded: Order = serde_json::from_value(stored).unwrap();
        assert_eq!(loaded, order);
    }
}
