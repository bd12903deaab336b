//! In-Memory Workflow Store
//!
//! A full implementation of the engine's unit-of-work ports over plain maps.
//! Transactions stage a copy of the shared state and swap it in on commit, so
//! an aborted unit of work leaves nothing behind — the same all-or-nothing
//! contract the Postgres store provides.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::warn;
use uuid::Uuid;

use core_kernel::{InvoiceId, ProductId, TenantScope};
use domain_inventory::{NewStockMovement, Product, StockMovement};
use domain_invoicing::{Invoice, WorkflowError, WorkflowStore, WorkflowTx};

#[derive(Debug, Default, Clone)]
struct MemoryState {
    invoices: HashMap<Uuid, Invoice>,
    products: HashMap<Uuid, Product>,
    movements: Vec<StockMovement>,
}

/// Shared in-memory store
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an invoice directly, bypassing the workflow
    pub fn seed_invoice(&self, invoice: Invoice) {
        let mut state = self.inner.lock().expect("memory store poisoned");
        state.invoices.insert(*invoice.id().as_uuid(), invoice);
    }

    /// Seeds a product directly
    pub fn seed_product(&self, product: Product) {
        let mut state = self.inner.lock().expect("memory store poisoned");
        state.products.insert(*product.id.as_uuid(), product);
    }

    /// Reads back a committed invoice
    pub fn invoice(&self, id: InvoiceId) -> Option<Invoice> {
        let state = self.inner.lock().expect("memory store poisoned");
        state.invoices.get(id.as_uuid()).cloned()
    }

    /// Reads back a committed product counter
    pub fn product_quantity(&self, id: ProductId) -> Option<i64> {
        let state = self.inner.lock().expect("memory store poisoned");
        state.products.get(id.as_uuid()).map(|p| p.quantity)
    }

    /// All committed movements, in posting order
    pub fn movements(&self) -> Vec<StockMovement> {
        let state = self.inner.lock().expect("memory store poisoned");
        state.movements.clone()
    }

    /// Committed movements tied to an invoice, in posting order
    pub fn movements_for_invoice(&self, invoice: InvoiceId) -> Vec<StockMovement> {
        self.movements()
            .into_iter()
            .filter(|m| m.invoice_id == Some(invoice))
            .collect()
    }
}

#[async_trait]
impl WorkflowStore for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<Self::Tx, WorkflowError> {
        let staged = self.inner.lock().expect("memory store poisoned").clone();
        Ok(MemoryTx {
            shared: Arc::clone(&self.inner),
            staged,
        })
    }
}

/// A staged unit of work over the in-memory state
#[derive(Debug)]
pub struct MemoryTx {
    shared: Arc<Mutex<MemoryState>>,
    staged: MemoryState,
}

#[async_trait]
impl WorkflowTx for MemoryTx {
    async fn load_invoice_for_update(
        &mut self,
        scope: TenantScope,
        id: InvoiceId,
    ) -> Result<Invoice, WorkflowError> {
        let invoice = self
            .staged
            .invoices
            .get(id.as_uuid())
            .cloned()
            .ok_or_else(|| WorkflowError::not_found("invoice"))?;
        Ok(scope.check_owned(invoice, "invoice")?)
    }

    async fn save_invoice(&mut self, invoice: &Invoice) -> Result<(), WorkflowError> {
        self.staged
            .invoices
            .insert(*invoice.id().as_uuid(), invoice.clone());
        Ok(())
    }

    async fn post_movement(
        &mut self,
        movement: NewStockMovement,
    ) -> Result<StockMovement, WorkflowError> {
        let product = self
            .staged
            .products
            .get_mut(movement.product_id.as_uuid())
            .filter(|p| p.tenant_id == movement.tenant_id)
            .ok_or(WorkflowError::ProductNotFound)?;

        product.apply_delta(movement.quantity_delta);
        if movement.quantity_delta < 0 && product.is_below_minimum() {
            warn!(
                product_id = %product.id,
                quantity = product.quantity,
                min_quantity = product.min_quantity,
                "stock fell to or below the advisory minimum"
            );
        }

        let posted = movement.into_movement();
        self.staged.movements.push(posted.clone());
        Ok(posted)
    }

    async fn movements_for(
        &mut self,
        scope: TenantScope,
        invoice: InvoiceId,
    ) -> Result<Vec<StockMovement>, WorkflowError> {
        Ok(self
            .staged
            .movements
            .iter()
            .filter(|m| m.invoice_id == Some(invoice) && m.tenant_id == scope.tenant())
            .cloned()
            .collect())
    }

    async fn product(
        &mut self,
        scope: TenantScope,
        id: ProductId,
    ) -> Result<Product, WorkflowError> {
        self.staged
            .products
            .get(id.as_uuid())
            .filter(|p| p.tenant_id == scope.tenant())
            .cloned()
            .ok_or(WorkflowError::ProductNotFound)
    }

    async fn commit(self) -> Result<(), WorkflowError> {
        let mut shared = self.shared.lock().expect("memory store poisoned");
        *shared = self.staged;
        Ok(())
    }
}

/// Decorator that fails the first N `begin` calls with a transient conflict
///
/// Used to exercise the engine's retry-once behavior.
#[derive(Debug, Clone)]
pub struct FlakyStore<S> {
    inner: S,
    remaining_failures: Arc<AtomicU32>,
}

impl<S> FlakyStore<S> {
    pub fn new(inner: S, failures: u32) -> Self {
        Self {
            inner,
            remaining_failures: Arc::new(AtomicU32::new(failures)),
        }
    }

    /// Failures not yet consumed
    pub fn remaining_failures(&self) -> u32 {
        self.remaining_failures.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<S: WorkflowStore> WorkflowStore for FlakyStore<S> {
    type Tx = S::Tx;

    async fn begin(&self) -> Result<Self::Tx, WorkflowError> {
        let remaining = self.remaining_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.remaining_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(WorkflowError::Conflict(
                "injected lock contention".to_string(),
            ));
        }
        self.inner.begin().await
    }
}
