//! Transactional workflow store over PostgreSQL
//!
//! Implements the engine's unit-of-work ports on a single database
//! transaction. The invoice row is taken `FOR UPDATE` so concurrent
//! transitions on the same document serialize at the row lock, and the
//! product counter moves via an in-database increment so concurrent invoices
//! never lose updates against each other.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::warn;

use core_kernel::{InvoiceId, ProductId, TenantScope};
use domain_inventory::{NewStockMovement, Product, StockMovement};
use domain_invoicing::{Invoice, WorkflowError, WorkflowStore, WorkflowTx};

use crate::error::DatabaseError;
use crate::repositories::{invoices, movements, products};

/// Opens workflow transactions on a connection pool
#[derive(Debug, Clone)]
pub struct PgWorkflowStore {
    pool: PgPool,
}

impl PgWorkflowStore {
    /// Creates a store over the given pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl WorkflowStore for PgWorkflowStore {
    type Tx = PgWorkflowTx;

    async fn begin(&self) -> Result<Self::Tx, WorkflowError> {
        let tx = self.pool.begin().await.map_err(DatabaseError::from)?;
        Ok(PgWorkflowTx { tx })
    }
}

/// One database transaction driving a single workflow operation
pub struct PgWorkflowTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl WorkflowTx for PgWorkflowTx {
    async fn load_invoice_for_update(
        &mut self,
        scope: TenantScope,
        id: InvoiceId,
    ) -> Result<Invoice, WorkflowError> {
        let row = invoices::fetch_invoice(&mut self.tx, scope.tenant(), id, true)
            .await?
            .ok_or_else(|| WorkflowError::not_found("invoice"))?;
        let items = invoices::fetch_items(&mut self.tx, id).await?;
        let invoice = invoices::hydrate(row, items)?;
        Ok(scope.check_owned(invoice, "invoice")?)
    }

    async fn save_invoice(&mut self, invoice: &Invoice) -> Result<(), WorkflowError> {
        let rows = invoices::update_invoice(&mut self.tx, invoice).await?;
        if rows == 0 {
            return Err(WorkflowError::not_found("invoice"));
        }
        invoices::replace_items(&mut self.tx, invoice).await?;
        Ok(())
    }

    async fn post_movement(
        &mut self,
        movement: NewStockMovement,
    ) -> Result<StockMovement, WorkflowError> {
        // Atomic in-database increment; the tenant filter doubles as the
        // ownership check.
        let updated: Option<(i64, i64)> = sqlx::query_as(
            "UPDATE products SET quantity = quantity + $3, updated_at = $4 \
             WHERE id = $1 AND tenant_id = $2 RETURNING quantity, min_quantity",
        )
        .bind(movement.product_id.as_uuid())
        .bind(movement.tenant_id.as_uuid())
        .bind(movement.quantity_delta)
        .bind(Utc::now())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(DatabaseError::from)?;

        let Some((quantity, min_quantity)) = updated else {
            return Err(WorkflowError::ProductNotFound);
        };
        if movement.quantity_delta < 0 && quantity <= min_quantity {
            warn!(
                product_id = %movement.product_id,
                quantity,
                min_quantity,
                "stock fell to or below the advisory minimum"
            );
        }

        let posted = movement.into_movement();
        movements::insert_movement(&mut self.tx, &posted).await?;
        Ok(posted)
    }

    async fn movements_for(
        &mut self,
        scope: TenantScope,
        invoice: InvoiceId,
    ) -> Result<Vec<StockMovement>, WorkflowError> {
        Ok(movements::fetch_for_invoice(&mut self.tx, scope.tenant(), invoice).await?)
    }

    async fn product(
        &mut self,
        scope: TenantScope,
        id: ProductId,
    ) -> Result<Product, WorkflowError> {
        let row = products::fetch_product(&mut self.tx, scope.tenant(), id)
            .await?
            .ok_or(WorkflowError::ProductNotFound)?;
        Ok(products::hydrate(row))
    }

    async fn commit(self) -> Result<(), WorkflowError> {
        self.tx.commit().await.map_err(DatabaseError::from)?;
        Ok(())
    }
}
