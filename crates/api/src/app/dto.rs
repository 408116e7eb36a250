use serde::Deserialize;
use serde_json::{Value, json};

use armory_cart::{Cart, Contribution};
use armory_catalog::StockItem;
use armory_core::{DomainError, StockItemId};
use armory_infra::store::{Page, Pagination};
use armory_ordering::{Order, OrderLineItem, StockItemSnapshot};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PageQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.per_page)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemRequest {
    pub item_id: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct PutCartRequest {
    pub items: Vec<CartItemRequest>,
}

impl PutCartRequest {
    pub fn contributions(&self) -> Result<Vec<Contribution>, DomainError> {
        self.items
            .iter()
            .map(|i| parse_item_id(&i.item_id).map(|id| Contribution::new(id, i.quantity)))
            .collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveItemQuery {
    pub item_id: String,
}

pub fn parse_item_id(raw: &str) -> Result<StockItemId, DomainError> {
    raw.trim().parse()
}

// -------------------------
// Response mapping
// -------------------------

pub fn armor_to_json(item: &StockItem) -> Value {
    let d = item.details();
    json!({
        "id": item.id_typed().to_string(),
        "name": d.name,
        "description": d.description,
        "category": d.category,
        "unitCost": d.unit_cost,
        "protection": d.protection,
        "quality": d.quality,
        "shield": d.shield,
        "discount": d.discount,
        "manufacturer": d.manufacturer,
        "createdBy": {
            "userId": d.created_by.user_id.to_string(),
            "userName": d.created_by.user_name,
        },
        "stock": item.stock(),
    })
}

pub fn cart_to_json(cart: &Cart) -> Value {
    json!({
        "owner": cart.owner().to_string(),
        "items": cart
            .entries()
            .iter()
            .map(|e| json!({ "itemId": e.item_id.to_string(), "quantity": e.quantity }))
            .collect::<Vec<_>>(),
        "updatedAt": cart.updated_at(),
    })
}

fn snapshot_to_json(s: &StockItemSnapshot) -> Value {
    json!({
        "id": s.item_id.to_string(),
        "name": s.name,
        "category": s.category,
        "unitCost": s.unit_cost,
        "discount": s.discount,
        "protection": s.protection,
        "quality": s.quality,
        "manufacturer": s.manufacturer,
    })
}

fn line_to_json(line: &OrderLineItem) -> Value {
    json!({
        "item": snapshot_to_json(&line.item),
        "quantity": line.quantity,
        "lineCost": line.line_cost,
    })
}

pub fn order_to_json(order: &Order) -> Value {
    json!({
        "id": order.id_typed().to_string(),
        "owner": order.owner().to_string(),
        "items": order.lines().iter().map(line_to_json).collect::<Vec<_>>(),
        "totalCost": order.total_cost(),
        "createdAt": order.created_at(),
    })
}

pub fn page_to_json<T>(page: &Page<T>, item_to_json: impl Fn(&T) -> Value) -> Value {
    json!({
        "items": page.items.iter().map(item_to_json).collect::<Vec<_>>(),
        "totalItems": page.total_items,
        "perPage": page.pagination.per_page,
        "currentPage": page.current_page(),
        "nextPage": page.next_page(),
        "previousPage": page.previous_page(),
        "lastPage": page.last_page(),
    })
}
