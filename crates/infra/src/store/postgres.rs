//! Postgres-backed stores.
//!
//! Domain documents are stored as JSONB next to the columns queries filter or
//! sort on. Stock and version are plain columns so the batch decrement can
//! guard on them inside a single transaction.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Duplicate` |
//! | Database (check constraint violation) | `23514` | `Conflict` |
//! | Database (deadlock detected) | `40P01` | `Conflict` |
//! | Database (serialization failure) | `40001` | `Conflict` |
//! | Database (other) | Any other | `Backend` |
//! | PoolClosed / Io / other | N/A | `Backend` |

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{debug, instrument};
use uuid::Uuid;

use armory_cart::{Cart, CartEntry};
use armory_catalog::{StockItem, StockItemDetails};
use armory_core::{AggregateRoot, OrderId, StockItemId, UserId};
use armory_ordering::Order;

use super::query::{Page, Pagination};
use super::r#trait::{CartStore, CatalogStore, OrderStore, StockDecrement, StoreError};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS stock_items (
        id          UUID PRIMARY KEY,
        details     JSONB NOT NULL,
        stock       BIGINT NOT NULL CHECK (stock >= 0),
        version     BIGINT NOT NULL DEFAULT 0,
        created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS carts (
        owner       UUID PRIMARY KEY,
        entries     JSONB NOT NULL,
        updated_at  TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS orders (
        id          UUID PRIMARY KEY,
        owner       UUID NOT NULL,
        total_cost  BIGINT NOT NULL,
        document    JSONB NOT NULL,
        created_at  TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS orders_owner_created_idx
        ON orders (owner, created_at DESC, id DESC)
    "#,
];

/// Create the tables used by the Postgres stores if they do not exist.
#[instrument(skip(pool), err)]
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    for statement in SCHEMA {
        sqlx::query(*statement)
            .execute(pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
    }
    Ok(())
}

/// Postgres catalog.
#[derive(Debug, Clone)]
pub struct PostgresCatalogStore {
    pool: Arc<PgPool>,
}

impl PostgresCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait]
impl CatalogStore for PostgresCatalogStore {
    #[instrument(skip(self), fields(item_id = %id), err)]
    async fn get(&self, id: StockItemId) -> Result<Option<StockItem>, StoreError> {
        let row = sqlx::query("SELECT id, details, stock, version FROM stock_items WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_stock_item", e))?;

        row.as_ref().map(stock_item_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn list(&self, pagination: Pagination) -> Result<Page<StockItem>, StoreError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stock_items")
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_stock_items", e))?;

        let rows = sqlx::query(
            r#"
            SELECT id, details, stock, version
            FROM stock_items
            ORDER BY id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(pagination.limit() as i64)
        .bind(pagination.offset() as i64)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_stock_items", e))?;

        let items = rows
            .iter()
            .map(stock_item_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, total.max(0) as u64, pagination))
    }

    #[instrument(skip(self, item), fields(item_id = %item.id_typed()), err)]
    async fn insert(&self, item: StockItem) -> Result<(), StoreError> {
        let details = to_json(item.details())?;
        sqlx::query(
            r#"
            INSERT INTO stock_items (id, details, stock, version)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(item.id_typed().as_uuid())
        .bind(details)
        .bind(i64::from(item.stock()))
        .bind(to_i64(item.version())?)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_stock_item", e))?;
        Ok(())
    }

    /// Every decrement runs as a guarded `UPDATE` in one transaction; the
    /// first one that matches no row rolls the whole batch back.
    ///
    /// Rows are locked in item id order whatever the batch order, so two
    /// batches over the same items cannot deadlock each other.
    #[instrument(skip(self, decrements), fields(batch = decrements.len()), err)]
    async fn commit_decrements(
        &self,
        decrements: &[StockDecrement],
    ) -> Result<Vec<StockItem>, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let mut lock_order: Vec<usize> = (0..decrements.len()).collect();
        lock_order.sort_by_key(|&i| decrements[i].item_id);

        let mut updated: Vec<Option<StockItem>> = (0..decrements.len()).map(|_| None).collect();
        for i in lock_order {
            let d = &decrements[i];
            let row = sqlx::query(
                r#"
                UPDATE stock_items
                SET stock = stock - $2, version = version + 1
                WHERE id = $1
                  AND stock >= $2
                  AND version = $3
                RETURNING id, details, stock, version
                "#,
            )
            .bind(d.item_id.as_uuid())
            .bind(i64::from(d.quantity))
            .bind(to_i64(d.expected_version.get())?)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("decrement_stock", e))?;

            let Some(row) = row else {
                tx.rollback()
                    .await
                    .map_err(|e| map_sqlx_error("rollback", e))?;
                debug!(item_id = %d.item_id, "guarded decrement matched no row");
                return Err(StoreError::Conflict(format!(
                    "stock item {} changed since it was read (expected {:?})",
                    d.item_id, d.expected_version
                )));
            };
            updated[i] = Some(stock_item_from_row(&row)?);
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(updated.into_iter().flatten().collect())
    }
}

/// Postgres cart storage.
#[derive(Debug, Clone)]
pub struct PostgresCartStore {
    pool: Arc<PgPool>,
}

impl PostgresCartStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait]
impl CartStore for PostgresCartStore {
    #[instrument(skip(self), fields(owner = %owner), err)]
    async fn find(&self, owner: UserId) -> Result<Option<Cart>, StoreError> {
        let row = sqlx::query("SELECT owner, entries, updated_at FROM carts WHERE owner = $1")
            .bind(owner.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_cart", e))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let entries: serde_json::Value = row.try_get("entries").map_err(corrupt)?;
        let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(corrupt)?;
        let entries: Vec<CartEntry> = from_json(entries)?;
        Ok(Some(Cart::from_parts(owner, entries, updated_at)))
    }

    #[instrument(skip(self, cart), fields(owner = %cart.owner(), entries = cart.entries().len()), err)]
    async fn upsert(&self, cart: &Cart) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO carts (owner, entries, updated_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (owner) DO UPDATE
            SET entries = EXCLUDED.entries, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(cart.owner().as_uuid())
        .bind(to_json(cart.entries())?)
        .bind(cart.updated_at())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("upsert_cart", e))?;
        Ok(())
    }
}

/// Postgres order storage (insert-only).
#[derive(Debug, Clone)]
pub struct PostgresOrderStore {
    pool: Arc<PgPool>,
}

impl PostgresOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    #[instrument(skip(self, order), fields(order_id = %order.id_typed(), owner = %order.owner()), err)]
    async fn create(&self, order: &Order) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, owner, total_cost, document, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(order.id_typed().as_uuid())
        .bind(order.owner().as_uuid())
        .bind(to_i64(order.total_cost().minor_units())?)
        .bind(to_json(order)?)
        .bind(order.created_at())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_order", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(order_id = %id), err)]
    async fn find(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let row = sqlx::query("SELECT document FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_order", e))?;

        row.as_ref().map(order_from_row).transpose()
    }

    #[instrument(skip(self), fields(owner = %owner), err)]
    async fn list_for_owner(
        &self,
        owner: UserId,
        pagination: Pagination,
    ) -> Result<Page<Order>, StoreError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE owner = $1")
            .bind(owner.as_uuid())
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_orders", e))?;

        let rows = sqlx::query(
            r#"
            SELECT document
            FROM orders
            WHERE owner = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(owner.as_uuid())
        .bind(pagination.limit() as i64)
        .bind(pagination.offset() as i64)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_orders", e))?;

        let orders = rows
            .iter()
            .map(order_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(orders, total.max(0) as u64, pagination))
    }
}

fn stock_item_from_row(row: &PgRow) -> Result<StockItem, StoreError> {
    let id: Uuid = row.try_get("id").map_err(corrupt)?;
    let details: serde_json::Value = row.try_get("details").map_err(corrupt)?;
    let stock: i64 = row.try_get("stock").map_err(corrupt)?;
    let version: i64 = row.try_get("version").map_err(corrupt)?;

    let details: StockItemDetails = from_json(details)?;
    let stock = u32::try_from(stock)
        .map_err(|_| StoreError::Corrupt(format!("stock item {id}: stock {stock} out of range")))?;
    let version = u64::try_from(version)
        .map_err(|_| StoreError::Corrupt(format!("stock item {id}: negative version {version}")))?;
    Ok(StockItem::from_parts(
        StockItemId::from_uuid(id),
        details,
        stock,
        version,
    ))
}

fn order_from_row(row: &PgRow) -> Result<Order, StoreError> {
    let document: serde_json::Value = row.try_get("document").map_err(corrupt)?;
    from_json(document)
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(value).map_err(|e| StoreError::Backend(format!("serialization failed: {e}")))
}

fn from_json<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> Result<T, StoreError> {
    serde_json::from_value(value).map_err(|e| StoreError::Corrupt(e.to_string()))
}

fn to_i64(value: u64) -> Result<i64, StoreError> {
    i64::try_from(value).map_err(|_| StoreError::Backend(format!("{value} exceeds BIGINT range")))
}

fn corrupt(err: sqlx::Error) -> StoreError {
    StoreError::Corrupt(format!("failed to read column: {err}"))
}

/// Map SQLx errors to `StoreError`.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            classify_database_error(db_err.code().as_deref(), msg)
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        other => StoreError::Backend(format!("{} failed: {}", operation, other)),
    }
}

fn classify_database_error(code: Option<&str>, msg: String) -> StoreError {
    match code {
        Some("23505") => StoreError::Duplicate(msg),
        // stock CHECK constraint
        Some("23514") => StoreError::Conflict(msg),
        // the transaction was aborted and rolled back; a fresh read can retry
        Some("40P01") | Some("40001") => StoreError::Conflict(msg),
        _ => StoreError::Backend(msg),
    }
}
