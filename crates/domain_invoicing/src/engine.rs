//! Invoice Workflow Engine
//!
//! The engine validates and executes lifecycle transitions, calling the stock
//! ledger at the two transitions where physical commitment changes hands:
//! approval deducts, un-payment restores. Every operation runs as one unit of
//! work — guard check, status mutation and ledger postings commit together or
//! not at all.
//!
//! Stock is tied to approval, not submission or payment: approval is the
//! point the sale is committed inventory-wise, while payment is purely
//! financial settlement. The `stock_deducted_at` marker on the aggregate is
//! the idempotency guard; both stock-affecting transitions consult it before
//! posting, so retried or racing calls never double-deduct or double-restore.
//! Restores replay the invoice's recorded deduction movements rather than its
//! current items, which may have been edited since the deduction.

use std::time::Duration;

use tracing::{debug, warn};

use core_kernel::{ActorId, InvoiceId, TenantId, TenantScope};
use domain_inventory::{outstanding_deductions, NewStockMovement};

use crate::error::WorkflowError;
use crate::invoice::{Invoice, InvoiceStatus};
use crate::store::{WorkflowStore, WorkflowTx};

/// Retry behavior for transient persistence conflicts
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Additional attempts after the first (default 1)
    pub max_retries: u32,
    /// Base delay, doubled per attempt
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 1,
            base_delay: Duration::from_millis(50),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    RecalcTotals,
    Submit,
    ValidateProforma,
    Approve,
    MarkPaid,
    MarkUnpaid,
    RequestModification,
    ApproveModification,
}

impl Transition {
    fn name(&self) -> &'static str {
        match self {
            Transition::RecalcTotals => "recalc_totals",
            Transition::Submit => "submit",
            Transition::ValidateProforma => "validate_proforma",
            Transition::Approve => "approve",
            Transition::MarkPaid => "mark_paid",
            Transition::MarkUnpaid => "mark_unpaid",
            Transition::RequestModification => "request_modification",
            Transition::ApproveModification => "approve_modification",
        }
    }
}

/// Drives invoice lifecycle transitions against a [`WorkflowStore`]
///
/// The returned aggregate still carries its domain events; callers drain them
/// with `take_events()` once the (already committed) call returns.
pub struct InvoiceWorkflowEngine<S: WorkflowStore> {
    store: S,
    retry: RetryPolicy,
}

impl<S: WorkflowStore> InvoiceWorkflowEngine<S> {
    /// Creates an engine with the default retry policy
    pub fn new(store: S) -> Self {
        Self {
            store,
            retry: RetryPolicy::default(),
        }
    }

    /// Overrides the retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Returns the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Recomputes totals from items; draft documents only
    pub async fn recalc_totals(
        &self,
        tenant: TenantId,
        invoice_id: InvoiceId,
    ) -> Result<Invoice, WorkflowError> {
        self.execute(Transition::RecalcTotals, tenant, invoice_id, None)
            .await
    }

    /// Submits a draft invoice for approval
    pub async fn submit(
        &self,
        tenant: TenantId,
        invoice_id: InvoiceId,
        actor: ActorId,
    ) -> Result<Invoice, WorkflowError> {
        self.execute(Transition::Submit, tenant, invoice_id, Some(actor))
            .await
    }

    /// Validates a draft proforma; terminal, no stock effect
    pub async fn validate_proforma(
        &self,
        tenant: TenantId,
        invoice_id: InvoiceId,
        actor: ActorId,
    ) -> Result<Invoice, WorkflowError> {
        self.execute(Transition::ValidateProforma, tenant, invoice_id, Some(actor))
            .await
    }

    /// Approves a pending invoice, deducting stock exactly once
    pub async fn approve(
        &self,
        tenant: TenantId,
        invoice_id: InvoiceId,
        actor: ActorId,
    ) -> Result<Invoice, WorkflowError> {
        self.execute(Transition::Approve, tenant, invoice_id, Some(actor))
            .await
    }

    /// Settles an approved invoice; no stock movement
    pub async fn mark_paid(
        &self,
        tenant: TenantId,
        invoice_id: InvoiceId,
        actor: ActorId,
    ) -> Result<Invoice, WorkflowError> {
        self.execute(Transition::MarkPaid, tenant, invoice_id, Some(actor))
            .await
    }

    /// Reverses payment and restores the recorded deduction exactly once
    pub async fn mark_unpaid(
        &self,
        tenant: TenantId,
        invoice_id: InvoiceId,
        actor: ActorId,
    ) -> Result<Invoice, WorkflowError> {
        self.execute(Transition::MarkUnpaid, tenant, invoice_id, Some(actor))
            .await
    }

    /// Raises a modification request on a committed document
    pub async fn request_modification(
        &self,
        tenant: TenantId,
        invoice_id: InvoiceId,
        actor: ActorId,
    ) -> Result<Invoice, WorkflowError> {
        self.execute(
            Transition::RequestModification,
            tenant,
            invoice_id,
            Some(actor),
        )
        .await
    }

    /// Grants a pending modification request
    pub async fn approve_modification(
        &self,
        tenant: TenantId,
        invoice_id: InvoiceId,
        actor: ActorId,
    ) -> Result<Invoice, WorkflowError> {
        self.execute(
            Transition::ApproveModification,
            tenant,
            invoice_id,
            Some(actor),
        )
        .await
    }

    async fn execute(
        &self,
        transition: Transition,
        tenant: TenantId,
        invoice_id: InvoiceId,
        actor: Option<ActorId>,
    ) -> Result<Invoice, WorkflowError> {
        let mut attempt = 0u32;
        loop {
            match self
                .try_execute(transition, tenant, invoice_id, actor)
                .await
            {
                Err(err) if err.is_retryable() && attempt < self.retry.max_retries => {
                    attempt += 1;
                    let delay = self.retry.base_delay * 2u32.saturating_pow(attempt - 1);
                    warn!(
                        transition = transition.name(),
                        %invoice_id,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "transient conflict, retrying transition"
                    );
                    tokio::time::sleep(delay).await;
                }
                result => return result,
            }
        }
    }

    async fn try_execute(
        &self,
        transition: Transition,
        tenant: TenantId,
        invoice_id: InvoiceId,
        actor: Option<ActorId>,
    ) -> Result<Invoice, WorkflowError> {
        let scope = TenantScope::new(tenant);
        let mut tx = self.store.begin().await?;
        let mut invoice = tx.load_invoice_for_update(scope, invoice_id).await?;

        match transition {
            Transition::RecalcTotals => {
                if invoice.status() != InvoiceStatus::Draft {
                    return Err(WorkflowError::invalid_transition(
                        "recalculate totals of",
                        invoice.status(),
                    ));
                }
                invoice.recalculate_totals()?;
            }
            Transition::Submit => invoice.submit()?,
            Transition::ValidateProforma => invoice.validate_proforma()?,
            Transition::Approve => {
                invoice.approve()?;
                if invoice.stock_deducted_at().is_none() {
                    let actor = Self::require_actor(actor)?;
                    for item in invoice.items() {
                        let Some(product_id) = item.product_id else {
                            continue;
                        };
                        let movement = NewStockMovement::sale_deduction(
                            tenant,
                            product_id,
                            invoice.id(),
                            item.quantity,
                            actor,
                        )?;
                        tx.post_movement(movement).await?;
                    }
                    invoice.mark_stock_deducted();
                }
            }
            Transition::MarkPaid => invoice.mark_paid()?,
            Transition::MarkUnpaid => {
                invoice.mark_unpaid()?;
                if invoice.stock_deducted_at().is_some() {
                    let actor = Self::require_actor(actor)?;
                    let movements = tx.movements_for(scope, invoice.id()).await?;
                    let mut restores: Vec<_> =
                        outstanding_deductions(&movements).into_iter().collect();
                    restores.sort_by_key(|(product_id, _)| *product_id.as_uuid());
                    for (product_id, quantity) in restores {
                        let movement = NewStockMovement::sale_reversal(
                            tenant,
                            product_id,
                            invoice.id(),
                            quantity,
                            actor,
                        )?;
                        tx.post_movement(movement).await?;
                    }
                    invoice.clear_stock_deducted();
                }
            }
            Transition::RequestModification => invoice.request_modification()?,
            Transition::ApproveModification => invoice.approve_modification()?,
        }

        tx.save_invoice(&invoice).await?;
        tx.commit().await?;

        debug!(
            transition = transition.name(),
            %invoice_id,
            status = %invoice.status(),
            "transition applied"
        );
        Ok(invoice)
    }

    fn require_actor(actor: Option<ActorId>) -> Result<ActorId, WorkflowError> {
        actor.ok_or_else(|| WorkflowError::storage("stock posting requires an actor"))
    }
}
