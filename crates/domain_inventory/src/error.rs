//! Inventory domain errors

use thiserror::Error;

/// Errors that can occur in the inventory domain
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InventoryError {
    /// Product not found in the tenant
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Movement quantity must be strictly positive
    #[error("Invalid movement quantity: {0}")]
    InvalidQuantity(i64),

    /// Persisted movement kind did not parse
    #[error("Unknown movement kind: {0}")]
    UnknownMovementKind(String),
}
