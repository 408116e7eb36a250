//! Domain error model.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::id::StockItemId;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Machine-checkable failure category.
///
/// Every error surfaced by the checkout services maps onto exactly one kind;
/// the HTTP layer derives status codes from it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidQuantity,
    ItemNotFound,
    InsufficientStock,
    ReservationConflict,
    EmptyOrder,
    StorageFailure,
    NotAuthorized,
    Validation,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidQuantity => "invalid_quantity",
            ErrorKind::ItemNotFound => "item_not_found",
            ErrorKind::InsufficientStock => "insufficient_stock",
            ErrorKind::ReservationConflict => "reservation_conflict",
            ErrorKind::EmptyOrder => "empty_order",
            ErrorKind::StorageFailure => "storage_failure",
            ErrorKind::NotAuthorized => "not_authorized",
            ErrorKind::Validation => "validation_error",
        }
    }

    /// Whether the caller may retry the same request unchanged.
    pub fn is_transient(self) -> bool {
        matches!(self, ErrorKind::ReservationConflict)
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain-level error.
///
/// Deterministic business failures only (validation, stock limits). Storage
/// and concurrency faults live in the infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A requested quantity was zero or negative.
    #[error("invalid quantity {quantity}{}", item_suffix(.item_id))]
    InvalidQuantity {
        item_id: Option<StockItemId>,
        quantity: i64,
    },

    /// A referenced stock item does not exist.
    #[error("stock item {0} not found")]
    ItemNotFound(StockItemId),

    /// Not enough units on hand to satisfy a request.
    #[error("insufficient stock for item {item_id}: {available} available, {requested} requested")]
    InsufficientStock {
        item_id: StockItemId,
        available: u32,
        requested: u64,
    },

    /// An order was attempted with no line items.
    #[error("cannot place an order without items")]
    EmptyOrder,

    /// A value failed validation (e.g. malformed input, arithmetic overflow).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

fn item_suffix(item_id: &Option<StockItemId>) -> String {
    match item_id {
        Some(id) => format!(" for item {id}"),
        None => String::new(),
    }
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn invalid_quantity(item_id: Option<StockItemId>, quantity: i64) -> Self {
        Self::InvalidQuantity { item_id, quantity }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::InvalidQuantity { .. } => ErrorKind::InvalidQuantity,
            DomainError::ItemNotFound(_) => ErrorKind::ItemNotFound,
            DomainError::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            DomainError::EmptyOrder => ErrorKind::EmptyOrder,
            DomainError::Validation(_) | DomainError::InvalidId(_) => ErrorKind::Validation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_stock_message_names_item_and_counts() {
        let item_id = StockItemId::new();
        let err = DomainError::InsufficientStock {
            item_id,
            available: 2,
            requested: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains(&item_id.to_string()));
        assert!(msg.contains("2 available"));
        assert!(msg.contains("3 requested"));
        assert_eq!(err.kind(), ErrorKind::InsufficientStock);
    }

    #[test]
    fn invalid_quantity_message_mentions_item_when_known() {
        let item_id = StockItemId::new();
        let with_item = DomainError::invalid_quantity(Some(item_id), -1).to_string();
        assert!(with_item.contains(&item_id.to_string()));

        let without_item = DomainError::invalid_quantity(None, 0).to_string();
        assert_eq!(without_item, "invalid quantity 0");
    }

    #[test]
    fn only_reservation_conflicts_are_transient() {
        assert!(ErrorKind::ReservationConflict.is_transient());
        assert!(!ErrorKind::InsufficientStock.is_transient());
        assert!(!ErrorKind::StorageFailure.is_transient());
    }
}
