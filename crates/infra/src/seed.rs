//! Catalog seeding from a JSON document.
//!
//! The document is an array of stock items in their stored shape:
//!
//! ```json
//! [{ "id": "...", "name": "Vanguard helm", "description": "...",
//!    "category": "helmet", "unit_cost": 10900, "protection": "medium",
//!    "quality": "low", "manufacturer": "starscape_systems",
//!    "created_by": { "user_id": "...", "user_name": "Freddy" }, "stock": 4 }]
//! ```

use std::path::Path;

use anyhow::Context;
use tracing::{info, instrument};

use armory_catalog::StockItem;

use crate::store::{CatalogStore, StoreError};

/// Parse and validate a seed document.
pub fn parse_catalog_seed(json: &str) -> anyhow::Result<Vec<StockItem>> {
    let items: Vec<StockItem> = serde_json::from_str(json).context("catalog seed is not a valid stock item array")?;
    for item in &items {
        item.details()
            .validate()
            .with_context(|| format!("invalid seed item {}", item.id_typed()))?;
    }
    Ok(items)
}

pub fn load_catalog_seed(path: &Path) -> anyhow::Result<Vec<StockItem>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog seed {}", path.display()))?;
    parse_catalog_seed(&json)
}

/// Insert seed items, skipping ids already present. Returns how many were new.
#[instrument(skip(catalog, items), fields(items = items.len()), err)]
pub async fn seed_catalog<C>(catalog: &C, items: Vec<StockItem>) -> Result<usize, StoreError>
where
    C: CatalogStore + ?Sized,
{
    let mut inserted = 0;
    for item in items {
        match catalog.insert(item).await {
            Ok(()) => inserted += 1,
            Err(StoreError::Duplicate(_)) => {}
            Err(e) => return Err(e),
        }
    }
    info!(inserted, "catalog seeded");
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use armory_core::StockItemId;

    use crate::store::InMemoryCatalogStore;

    fn document(id: StockItemId, description: &str) -> String {
        serde_json::json!([{
            "id": id,
            "name": "Vanguard helm",
            "description": description,
            "category": "helmet",
            "unit_cost": 10900,
            "protection": "medium",
            "quality": "low",
            "discount": 0.1,
            "manufacturer": "starscape_systems",
            "created_by": { "user_id": uuid::Uuid::now_v7(), "user_name": "Freddy" },
            "stock": 4
        }])
        .to_string()
    }

    #[tokio::test]
    async fn seeding_twice_inserts_once() {
        let id = StockItemId::new();
        let items = parse_catalog_seed(&document(id, "A ordinary looking helmet.")).unwrap();
        let catalog = InMemoryCatalogStore::new();

        assert_eq!(seed_catalog(&catalog, items.clone()).await.unwrap(), 1);
        assert_eq!(seed_catalog(&catalog, items).await.unwrap(), 0);
        assert_eq!(catalog.get(id).await.unwrap().unwrap().stock(), 4);
    }

    #[test]
    fn invalid_details_are_rejected() {
        let err = parse_catalog_seed(&document(StockItemId::new(), "tiny")).unwrap_err();
        assert!(err.to_string().contains("invalid seed item"));
    }
}
