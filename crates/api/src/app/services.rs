use std::sync::Arc;

use anyhow::Context;
use sqlx::PgPool;

use armory_catalog::StockItem;
use armory_infra::seed::{load_catalog_seed, seed_catalog};
use armory_infra::store::{
    CartStore, CatalogStore, InMemoryCartStore, InMemoryCatalogStore, InMemoryOrderStore,
    OrderStore, PostgresCartStore, PostgresCatalogStore, PostgresOrderStore, ensure_schema,
};
use armory_infra::{CartService, InventoryReservation, OrderAssembler, UserLocks};

use crate::config::ApiConfig;

pub type SharedCatalog = Arc<dyn CatalogStore>;
pub type SharedCarts = Arc<dyn CartStore>;
pub type SharedOrders = Arc<dyn OrderStore>;

/// Store handles and services shared by every handler.
pub struct AppServices {
    pub catalog: SharedCatalog,
    pub orders: SharedOrders,
    pub carts: CartService<SharedCatalog, SharedCarts>,
    pub checkout: OrderAssembler<SharedCatalog, SharedCarts, SharedOrders>,
}

impl AppServices {
    /// Wire services over the given stores. Cart edits and checkout share one
    /// lock table.
    pub fn new(
        catalog: SharedCatalog,
        carts: SharedCarts,
        orders: SharedOrders,
        reservation_max_attempts: u32,
    ) -> Self {
        let locks = Arc::new(UserLocks::new());
        let reservation =
            InventoryReservation::new(catalog.clone()).with_max_attempts(reservation_max_attempts);
        Self {
            carts: CartService::new(catalog.clone(), carts.clone(), locks.clone()),
            checkout: OrderAssembler::new(reservation, carts, orders.clone(), locks),
            catalog,
            orders,
        }
    }

    /// In-memory stores (dev/test), optionally pre-loaded with stock items.
    pub fn in_memory(items: Vec<StockItem>, reservation_max_attempts: u32) -> Self {
        Self::new(
            Arc::new(InMemoryCatalogStore::with_items(items)),
            Arc::new(InMemoryCartStore::new()),
            Arc::new(InMemoryOrderStore::new()),
            reservation_max_attempts,
        )
    }

    pub async fn persistent(database_url: &str, reservation_max_attempts: u32) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .context("failed to connect to Postgres")?;
        ensure_schema(&pool).await.context("failed to prepare schema")?;

        Ok(Self::new(
            Arc::new(PostgresCatalogStore::new(pool.clone())),
            Arc::new(PostgresCartStore::new(pool.clone())),
            Arc::new(PostgresOrderStore::new(pool)),
            reservation_max_attempts,
        ))
    }
}

/// Select stores from config and apply the catalog seed, if any.
pub async fn build_services(config: &ApiConfig) -> anyhow::Result<AppServices> {
    let services = match (config.use_persistent_stores, config.database_url.as_deref()) {
        (true, Some(url)) => {
            tracing::info!("using Postgres stores");
            AppServices::persistent(url, config.reservation_max_attempts).await?
        }
        (true, None) => anyhow::bail!("DATABASE_URL must be set when USE_PERSISTENT_STORES=true"),
        (false, _) => {
            tracing::info!("using in-memory stores");
            AppServices::in_memory(Vec::new(), config.reservation_max_attempts)
        }
    };

    if let Some(path) = &config.catalog_seed {
        let items = load_catalog_seed(path)?;
        seed_catalog(services.catalog.as_ref(), items)
            .await
            .context("failed to seed catalog")?;
    }

    Ok(services)
}
