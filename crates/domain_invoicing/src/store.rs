//! Unit-of-work ports for the workflow engine
//!
//! The engine never touches a connection directly. Each operation runs
//! against a [`WorkflowTx`]: load the invoice under an update lock, mutate,
//! post ledger movements, save, commit. Either everything in the transaction
//! lands or nothing does.

use async_trait::async_trait;

use core_kernel::{InvoiceId, ProductId, TenantScope};
use domain_inventory::{NewStockMovement, Product, StockMovement};

use crate::error::WorkflowError;
use crate::invoice::Invoice;

/// Opens transactional units of work
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    type Tx: WorkflowTx + Send;

    /// Begins a transaction
    async fn begin(&self) -> Result<Self::Tx, WorkflowError>;
}

/// One transactional unit of work
///
/// Implementations must hold an update lock on the invoice row from
/// `load_invoice_for_update` until `commit`, and must apply product counter
/// changes as in-store atomic increments.
#[async_trait]
pub trait WorkflowTx: Send {
    /// Loads an invoice under an update lock
    ///
    /// # Errors
    ///
    /// `NotFound` when the invoice does not exist in the scope's tenant; the
    /// error never distinguishes absence from cross-tenant ownership.
    async fn load_invoice_for_update(
        &mut self,
        scope: TenantScope,
        id: InvoiceId,
    ) -> Result<Invoice, WorkflowError>;

    /// Persists the aggregate and its items
    async fn save_invoice(&mut self, invoice: &Invoice) -> Result<(), WorkflowError>;

    /// Appends a ledger entry and adjusts the product counter atomically
    ///
    /// # Errors
    ///
    /// `ProductNotFound` when the product is not in the movement's tenant.
    async fn post_movement(
        &mut self,
        movement: NewStockMovement,
    ) -> Result<StockMovement, WorkflowError>;

    /// The ordered movement history of an invoice
    async fn movements_for(
        &mut self,
        scope: TenantScope,
        invoice: InvoiceId,
    ) -> Result<Vec<StockMovement>, WorkflowError>;

    /// Reads a product's current state
    async fn product(
        &mut self,
        scope: TenantScope,
        id: ProductId,
    ) -> Result<Product, WorkflowError>;

    /// Commits the unit of work
    async fn commit(self) -> Result<(), WorkflowError>;
}
