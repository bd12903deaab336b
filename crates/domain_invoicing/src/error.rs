//! Invoicing domain errors

use thiserror::Error;

use core_kernel::{MoneyError, ScopeError};
use domain_inventory::InventoryError;

use crate::invoice::InvoiceStatus;

/// Errors that can occur while driving the invoice workflow
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// A lifecycle guard rejected the attempted transition
    #[error("Cannot {action} an invoice in status {status}")]
    InvalidTransition {
        action: &'static str,
        status: InvoiceStatus,
    },

    /// Entity absent or owned by another tenant; never distinguishes the two
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// Referenced product vanished or belongs to another tenant
    #[error("Product not found")]
    ProductNotFound,

    /// Lock or serialization contention; retried once before surfacing
    #[error("Transient conflict: {0}")]
    Conflict(String),

    /// Input failed domain validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Monetary arithmetic failed
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    /// Any other persistence failure
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl WorkflowError {
    pub fn invalid_transition(action: &'static str, status: InvoiceStatus) -> Self {
        WorkflowError::InvalidTransition { action, status }
    }

    pub fn not_found(entity: &'static str) -> Self {
        WorkflowError::NotFound { entity }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        WorkflowError::Storage {
            message: message.into(),
            source: None,
        }
    }

    pub fn storage_with(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        WorkflowError::Storage {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns true if the operation may succeed when replayed
    pub fn is_retryable(&self) -> bool {
        matches!(self, WorkflowError::Conflict(_))
    }
}

impl From<ScopeError> for WorkflowError {
    fn from(err: ScopeError) -> Self {
        WorkflowError::NotFound { entity: err.entity }
    }
}

impl From<InventoryError> for WorkflowError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::ProductNotFound(_) => WorkflowError::ProductNotFound,
            InventoryError::InvalidQuantity(q) => {
                WorkflowError::Validation(format!("movement quantity must be positive, got {q}"))
            }
            InventoryError::UnknownMovementKind(kind) => {
                WorkflowError::storage(format!("unknown movement kind '{kind}'"))
            }
        }
    }
}
