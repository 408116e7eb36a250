use serde::{Deserialize, Serialize};

use armory_core::{AggregateRoot, Discount, DomainError, DomainResult, Money, StockItemId, UserId};

/// Armor slot the item occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Helmet,
    Body,
    Arm,
    Leg,
}

/// Protection and quality grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Manufacturer {
    StarscapeSystems,
    AdraxCorp,
    OrianLabs,
}

/// Catalog user who created the item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    pub user_id: UserId,
    pub user_name: String,
}

const DESCRIPTION_MIN_CHARS: usize = 5;
const DESCRIPTION_MAX_CHARS: usize = 2000;

/// Attributes owned by catalog management.
///
/// The checkout never writes these; orders copy the price-relevant ones into a
/// frozen snapshot at reservation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockItemDetails {
    pub name: String,
    pub description: String,
    pub category: Category,
    /// Price per unit in minor currency units.
    pub unit_cost: Money,
    pub protection: Tier,
    pub quality: Tier,
    #[serde(default)]
    pub shield: u32,
    #[serde(default)]
    pub discount: Discount,
    pub manufacturer: Manufacturer,
    pub created_by: Creator,
}

impl StockItemDetails {
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        let chars = self.description.chars().count();
        if !(DESCRIPTION_MIN_CHARS..=DESCRIPTION_MAX_CHARS).contains(&chars) {
            return Err(DomainError::validation(format!(
                "description must be {DESCRIPTION_MIN_CHARS}..={DESCRIPTION_MAX_CHARS} characters (got {chars})"
            )));
        }
        if self.created_by.user_name.trim().is_empty() {
            return Err(DomainError::validation("creator name cannot be empty"));
        }
        Ok(())
    }
}

/// Aggregate root: StockItem.
///
/// `stock` and `version` are private: stores hydrate them through
/// [`StockItem::from_parts`] and reservations change them only through
/// [`StockItem::decremented`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockItem {
    id: StockItemId,
    #[serde(flatten)]
    details: StockItemDetails,
    stock: u32,
    #[serde(default)]
    version: u64,
}

impl StockItem {
    /// A freshly catalogued item at version 0.
    pub fn new(id: StockItemId, details: StockItemDetails, stock: u32) -> Self {
        Self::from_parts(id, details, stock, 0)
    }

    /// Rehydrate from storage.
    pub fn from_parts(id: StockItemId, details: StockItemDetails, stock: u32, version: u64) -> Self {
        Self {
            id,
            details,
            stock,
            version,
        }
    }

    pub fn id_typed(&self) -> StockItemId {
        self.id
    }

    pub fn details(&self) -> &StockItemDetails {
        &self.details
    }

    pub fn stock(&self) -> u32 {
        self.stock
    }

    /// Fail with `InsufficientStock` unless `requested` units are on hand.
    pub fn ensure_available(&self, requested: u64) -> DomainResult<()> {
        if requested > u64::from(self.stock) {
            return Err(DomainError::InsufficientStock {
                item_id: self.id,
                available: self.stock,
                requested,
            });
        }
        Ok(())
    }

    /// The item after removing `quantity` units, one version later.
    pub fn decremented(&self, quantity: u64) -> DomainResult<StockItem> {
        self.ensure_available(quantity)?;
        // ensure_available bounds quantity by a u32
        let remaining = self.stock - quantity as u32;
        Ok(Self {
            id: self.id,
            details: self.details.clone(),
            stock: remaining,
            version: self.version + 1,
        })
    }
}

impl AggregateRoot for StockItem {
    type Id = StockItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_details() -> StockItemDetails {
        StockItemDetails {
            name: "Vanguard helm".to_string(),
            description: "A ordinary looking helmet.".to_string(),
            category: Category::Helmet,
            unit_cost: Money::from_minor(10_900),
            protection: Tier::Medium,
            quality: Tier::Low,
            shield: 0,
            discount: Discount::NONE,
            manufacturer: Manufacturer::StarscapeSystems,
            created_by: Creator {
                user_id: UserId::new(),
                user_name: "Freddy".to_string(),
            },
        }
    }

    #[test]
    fn decrement_reduces_stock_and_bumps_version() {
        let item = StockItem::new(StockItemId::new(), sample_details(), 5);
        let after = item.decremented(3).unwrap();
        assert_eq!(after.stock(), 2);
        assert_eq!(after.version(), item.version() + 1);
        assert_eq!(after.details(), item.details());
        // original untouched
        assert_eq!(item.stock(), 5);
    }

    #[test]
    fn decrement_beyond_stock_reports_available_and_requested() {
        let item = StockItem::new(StockItemId::new(), sample_details(), 2);
        let err = item.decremented(3).unwrap_err();
        assert_eq!(
            err,
            DomainError::InsufficientStock {
                item_id: item.id_typed(),
                available: 2,
                requested: 3,
            }
        );
    }

    #[test]
    fn requesting_exactly_the_stock_empties_it() {
        let item = StockItem::new(StockItemId::new(), sample_details(), 4);
        assert_eq!(item.decremented(4).unwrap().stock(), 0);
    }

    #[test]
    fn validate_rejects_short_description() {
        let mut details = sample_details();
        details.description = "tiny".to_string();
        assert!(details.validate().is_err());
        assert!(sample_details().validate().is_ok());
    }

    #[test]
    fn deserializes_catalog_document_with_defaults() {
        let json = serde_json::json!({
            "id": StockItemId::new(),
            "name": "Orian greaves",
            "description": "Light leg plating.",
            "category": "leg",
            "unit_cost": 4200,
            "protection": "low",
            "quality": "high",
            "manufacturer": "orian_labs",
            "created_by": { "user_id": UserId::new(), "user_name": "Freddy" },
            "stock": 7
        });
        let item: StockItem = serde_json::from_value(json).unwrap();
        assert_eq!(item.stock(), 7);
        assert_eq!(item.version(), 0);
        assert_eq!(item.details().discount, Discount::NONE);
        assert_eq!(item.details().manufacturer, Manufacturer::OrianLabs);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: a decrement either succeeds without going negative or
            /// fails leaving nothing changed.
            #[test]
            fn decrement_never_goes_negative(stock in 0u32..1_000, requested in 0u64..2_000) {
                let item = StockItem::new(StockItemId::new(), sample_details(), stock);
                match item.decremented(requested) {
                    Ok(after) => {
                        prop_assert!(requested <= u64::from(stock));
                        prop_assert_eq!(u64::from(after.stock()), u64::from(stock) - requested);
                        prop_assert_eq!(after.version(), 1);
                    }
                    Err(DomainError::InsufficientStock { available, requested: r, .. }) => {
                        prop_assert!(requested > u64::from(stock));
                        prop_assert_eq!(available, stock);
                        prop_assert_eq!(r, requested);
                    }
                    Err(other) => prop_assert!(false, "unexpected error {other:?}"),
                }
            }
        }
    }
}
