//! Invoice Aggregate Root
//!
//! The Invoice aggregate is the consistency boundary for a billing document
//! and its line items. It owns totals computation and the lifecycle status
//! field; it knows nothing about stock.
//!
//! # Invariants
//!
//! - `subtotal` and `total` are derived from items, never hand-set; they are
//!   recomputed before any transition out of `Draft` is accepted.
//! - Line totals use cent truncation: `line_total = unit_price × quantity`,
//!   truncated toward zero at two fraction digits.
//! - Items are editable while `Draft`, and outside `Draft` only for the one
//!   cycle following an approved modification request.
//!
//! # State Machine
//!
//! `Draft → Pending → Approved → Paid`, with `Paid → Pending` as the explicit
//! un-payment reversal. Proformas take the `Draft → Approved` shortcut and
//! never advance further.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{ActorId, InvoiceId, InvoiceItemId, Money, ProductId, TenantId, TenantScoped};

use crate::error::WorkflowError;
use crate::events::{CommittedLine, InvoiceEvent};

/// Billing document kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// A stock-committing invoice
    Invoice,
    /// A quotation document; validated proformas never touch stock
    Proforma,
}

impl DocumentType {
    /// Stable string form used in persistence
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Invoice => "invoice",
            DocumentType::Proforma => "proforma",
        }
    }

    /// Parses the stable string form
    pub fn parse(s: &str) -> Result<Self, WorkflowError> {
        match s {
            "invoice" => Ok(DocumentType::Invoice),
            "proforma" => Ok(DocumentType::Proforma),
            other => Err(WorkflowError::storage(format!(
                "unknown document type '{other}'"
            ))),
        }
    }
}

/// Invoice lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Being drafted; items editable, totals fluid
    Draft,
    /// Submitted and awaiting approval
    Pending,
    /// Financially committed; stock deducted for invoices
    Approved,
    /// Settled
    Paid,
}

impl InvoiceStatus {
    /// Stable string form used in persistence
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Approved => "approved",
            InvoiceStatus::Paid => "paid",
        }
    }

    /// Parses the stable string form
    pub fn parse(s: &str) -> Result<Self, WorkflowError> {
        match s {
            "draft" => Ok(InvoiceStatus::Draft),
            "pending" => Ok(InvoiceStatus::Pending),
            "approved" => Ok(InvoiceStatus::Approved),
            "paid" => Ok(InvoiceStatus::Paid),
            other => Err(WorkflowError::storage(format!(
                "unknown invoice status '{other}'"
            ))),
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A line item on an invoice
///
/// Either references a catalog product or carries a free-text description
/// only; free-text lines never generate stock movements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceItem {
    /// Item identifier
    pub id: InvoiceItemId,
    /// Referenced product, if any
    pub product_id: Option<ProductId>,
    /// Line description
    pub description: String,
    /// Unit count, strictly positive
    pub quantity: i64,
    /// Price per unit
    pub unit_price: Money,
    /// `unit_price × quantity`, truncated to the cent
    pub line_total: Money,
}

impl InvoiceItem {
    /// Creates a line for a catalog product
    pub fn for_product(
        product_id: ProductId,
        description: impl Into<String>,
        quantity: i64,
        unit_price: Money,
    ) -> Result<Self, WorkflowError> {
        Self::build(Some(product_id), description.into(), quantity, unit_price)
    }

    /// Creates a free-text line with no stock effect
    pub fn free_text(
        description: impl Into<String>,
        quantity: i64,
        unit_price: Money,
    ) -> Result<Self, WorkflowError> {
        Self::build(None, description.into(), quantity, unit_price)
    }

    fn build(
        product_id: Option<ProductId>,
        description: String,
        quantity: i64,
        unit_price: Money,
    ) -> Result<Self, WorkflowError> {
        if quantity <= 0 {
            return Err(WorkflowError::Validation(format!(
                "item quantity must be positive, got {quantity}"
            )));
        }
        let line_total = unit_price.times(quantity)?;
        Ok(Self {
            id: InvoiceItemId::new_v7(),
            product_id,
            description,
            quantity,
            unit_price,
            line_total,
        })
    }
}

/// The Invoice aggregate root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique identifier
    id: InvoiceId,
    /// Owning tenant
    tenant_id: TenantId,
    /// Sequential human-readable number, unique per tenant
    number: String,
    /// Document kind
    doc_type: DocumentType,
    /// Current lifecycle status
    status: InvoiceStatus,
    /// Derived sum of line totals
    subtotal: Money,
    /// Derived grand total
    total: Money,
    /// Set when the document was approved
    approved_at: Option<DateTime<Utc>>,
    /// Set when the document was paid
    paid_at: Option<DateTime<Utc>>,
    /// Idempotency guard for the stock deduction
    stock_deducted_at: Option<DateTime<Utc>>,
    /// Pending modification request marker
    modification_requested_at: Option<DateTime<Utc>>,
    /// One-cycle edit unlock granted by an approved modification
    items_unlocked: bool,
    /// Actor that created the draft
    created_by: ActorId,
    /// Owned line items
    items: Vec<InvoiceItem>,
    /// Domain events to be drained after commit
    #[serde(skip)]
    events: Vec<InvoiceEvent>,
    /// Creation timestamp
    created_at: DateTime<Utc>,
    /// Last update timestamp
    updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Creates a new draft
    pub fn new(
        tenant_id: TenantId,
        number: impl Into<String>,
        doc_type: DocumentType,
        created_by: ActorId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: InvoiceId::new_v7(),
            tenant_id,
            number: number.into(),
            doc_type,
            status: InvoiceStatus::Draft,
            subtotal: Money::zero(),
            total: Money::zero(),
            approved_at: None,
            paid_at: None,
            stock_deducted_at: None,
            modification_requested_at: None,
            items_unlocked: false,
            created_by,
            items: Vec::new(),
            events: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Rehydrates an aggregate from persisted state
    ///
    /// Store implementations only; bypasses lifecycle guards.
    #[allow(clippy::too_many_arguments)]
    pub fn from_stored(
        id: InvoiceId,
        tenant_id: TenantId,
        number: String,
        doc_type: DocumentType,
        status: InvoiceStatus,
        subtotal: Money,
        total: Money,
        approved_at: Option<DateTime<Utc>>,
        paid_at: Option<DateTime<Utc>>,
        stock_deducted_at: Option<DateTime<Utc>>,
        modification_requested_at: Option<DateTime<Utc>>,
        items_unlocked: bool,
        created_by: ActorId,
        items: Vec<InvoiceItem>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            tenant_id,
            number,
            doc_type,
            status,
            subtotal,
            total,
            approved_at,
            paid_at,
            stock_deducted_at,
            modification_requested_at,
            items_unlocked,
            created_by,
            items,
            events: Vec::new(),
            created_at,
            updated_at,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn id(&self) -> InvoiceId {
        self.id
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn doc_type(&self) -> DocumentType {
        self.doc_type
    }

    pub fn status(&self) -> InvoiceStatus {
        self.status
    }

    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn approved_at(&self) -> Option<DateTime<Utc>> {
        self.approved_at
    }

    pub fn paid_at(&self) -> Option<DateTime<Utc>> {
        self.paid_at
    }

    pub fn stock_deducted_at(&self) -> Option<DateTime<Utc>> {
        self.stock_deducted_at
    }

    pub fn modification_requested_at(&self) -> Option<DateTime<Utc>> {
        self.modification_requested_at
    }

    pub fn items_unlocked(&self) -> bool {
        self.items_unlocked
    }

    pub fn created_by(&self) -> ActorId {
        self.created_by
    }

    pub fn items(&self) -> &[InvoiceItem] {
        &self.items
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns accumulated domain events and clears them
    pub fn take_events(&mut self) -> Vec<InvoiceEvent> {
        std::mem::take(&mut self.events)
    }

    /// True while line items may be edited
    pub fn can_edit_items(&self) -> bool {
        self.status == InvoiceStatus::Draft || self.items_unlocked
    }

    // ------------------------------------------------------------------
    // Item collection
    // ------------------------------------------------------------------

    /// Adds a line item and recomputes totals
    ///
    /// # Errors
    ///
    /// `InvalidTransition` when items are locked for the current status.
    pub fn add_item(&mut self, item: InvoiceItem) -> Result<(), WorkflowError> {
        if !self.can_edit_items() {
            return Err(WorkflowError::invalid_transition("edit items on", self.status));
        }
        self.items.push(item);
        self.recalculate_totals()
    }

    /// Removes a line item and recomputes totals
    pub fn remove_item(&mut self, item_id: InvoiceItemId) -> Result<(), WorkflowError> {
        if !self.can_edit_items() {
            return Err(WorkflowError::invalid_transition("edit items on", self.status));
        }
        self.items.retain(|item| item.id != item_id);
        self.recalculate_totals()
    }

    /// Recomputes line totals, subtotal and total from the item list
    ///
    /// Idempotent for an unchanged item list.
    pub fn recalculate_totals(&mut self) -> Result<(), WorkflowError> {
        for item in &mut self.items {
            item.line_total = item.unit_price.times(item.quantity)?;
        }
        self.subtotal = self.items.iter().map(|item| item.line_total).sum();
        self.total = self.subtotal;
        self.updated_at = Utc::now();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Lifecycle transitions
    // ------------------------------------------------------------------

    /// Submits a draft invoice for approval
    pub fn submit(&mut self) -> Result<(), WorkflowError> {
        if self.doc_type != DocumentType::Invoice || self.status != InvoiceStatus::Draft {
            return Err(WorkflowError::invalid_transition("submit", self.status));
        }
        self.recalculate_totals()?;
        self.enter(InvoiceStatus::Pending);
        self.events.push(InvoiceEvent::Submitted {
            invoice_id: self.id,
            tenant_id: self.tenant_id,
            timestamp: self.updated_at,
        });
        Ok(())
    }

    /// Validates a proforma, its terminal state; never touches stock
    pub fn validate_proforma(&mut self) -> Result<(), WorkflowError> {
        if self.doc_type != DocumentType::Proforma || self.status != InvoiceStatus::Draft {
            return Err(WorkflowError::invalid_transition("validate", self.status));
        }
        self.recalculate_totals()?;
        self.enter(InvoiceStatus::Approved);
        self.approved_at = Some(self.updated_at);
        self.events.push(InvoiceEvent::ProformaValidated {
            invoice_id: self.id,
            tenant_id: self.tenant_id,
            timestamp: self.updated_at,
        });
        Ok(())
    }

    /// Approves a pending invoice, the stock-committing transition
    ///
    /// The ledger posting itself is orchestrated by the workflow engine; the
    /// aggregate records status, timestamp and the committed lines.
    pub fn approve(&mut self) -> Result<(), WorkflowError> {
        if self.doc_type != DocumentType::Invoice || self.status != InvoiceStatus::Pending {
            return Err(WorkflowError::invalid_transition("approve", self.status));
        }
        self.enter(InvoiceStatus::Approved);
        self.approved_at = Some(self.updated_at);
        self.events.push(InvoiceEvent::Approved {
            invoice_id: self.id,
            tenant_id: self.tenant_id,
            number: self.number.clone(),
            lines: self
                .items
                .iter()
                .map(|item| CommittedLine {
                    product_id: item.product_id,
                    description: item.description.clone(),
                    quantity: item.quantity,
                })
                .collect(),
            timestamp: self.updated_at,
        });
        Ok(())
    }

    /// Marks an approved invoice as paid; settlement only, no stock effect
    pub fn mark_paid(&mut self) -> Result<(), WorkflowError> {
        if self.doc_type != DocumentType::Invoice || self.status != InvoiceStatus::Approved {
            return Err(WorkflowError::invalid_transition("mark paid", self.status));
        }
        self.enter(InvoiceStatus::Paid);
        self.paid_at = Some(self.updated_at);
        self.events.push(InvoiceEvent::MarkedPaid {
            invoice_id: self.id,
            timestamp: self.updated_at,
        });
        Ok(())
    }

    /// Reverses payment, returning the invoice to pending
    ///
    /// The engine restores stock from the recorded deduction movements when
    /// `stock_deducted_at` is set.
    pub fn mark_unpaid(&mut self) -> Result<(), WorkflowError> {
        if self.doc_type != DocumentType::Invoice || self.status != InvoiceStatus::Paid {
            return Err(WorkflowError::invalid_transition("mark unpaid", self.status));
        }
        self.enter(InvoiceStatus::Pending);
        self.paid_at = None;
        self.events.push(InvoiceEvent::MarkedUnpaid {
            invoice_id: self.id,
            timestamp: self.updated_at,
        });
        Ok(())
    }

    /// Requests permission to modify a committed document
    pub fn request_modification(&mut self) -> Result<(), WorkflowError> {
        let committed = matches!(self.status, InvoiceStatus::Approved | InvoiceStatus::Paid);
        if !committed || self.modification_requested_at.is_some() {
            return Err(WorkflowError::invalid_transition(
                "request modification of",
                self.status,
            ));
        }
        let now = Utc::now();
        self.modification_requested_at = Some(now);
        self.updated_at = now;
        self.events.push(InvoiceEvent::ModificationRequested {
            invoice_id: self.id,
            timestamp: now,
        });
        Ok(())
    }

    /// Grants a pending modification request, unlocking items for one cycle
    pub fn approve_modification(&mut self) -> Result<(), WorkflowError> {
        if self.modification_requested_at.is_none() {
            return Err(WorkflowError::invalid_transition(
                "approve modification of",
                self.status,
            ));
        }
        let now = Utc::now();
        self.modification_requested_at = None;
        self.items_unlocked = true;
        self.updated_at = now;
        self.events.push(InvoiceEvent::ModificationApproved {
            invoice_id: self.id,
            timestamp: now,
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Stock deduction guard (engine-driven)
    // ------------------------------------------------------------------

    /// Records that the deduction movements for this invoice were posted
    pub fn mark_stock_deducted(&mut self) {
        let now = Utc::now();
        self.stock_deducted_at = Some(now);
        self.updated_at = now;
    }

    /// Records that the deduction was fully reversed
    pub fn clear_stock_deducted(&mut self) {
        self.stock_deducted_at = None;
        self.updated_at = Utc::now();
    }

    /// Applies a status change, closing any one-cycle edit unlock
    fn enter(&mut self, status: InvoiceStatus) {
        self.status = status;
        self.items_unlocked = false;
        self.updated_at = Utc::now();
    }
}

impl TenantScoped for Invoice {
    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn draft_invoice() -> Invoice {
        Invoice::new(
            TenantId::new(),
            "2026-000001",
            DocumentType::Invoice,
            ActorId::new(),
        )
    }

    #[test]
    fn test_totals_follow_items() {
        let mut invoice = draft_invoice();
        invoice
            .add_item(InvoiceItem::free_text("Setup fee", 1, Money::new(dec!(49.90))).unwrap())
            .unwrap();
        invoice
            .add_item(
                InvoiceItem::for_product(
                    ProductId::new(),
                    "Widget",
                    3,
                    Money::new(dec!(10.33)),
                )
                .unwrap(),
            )
            .unwrap();

        assert_eq!(invoice.subtotal().amount(), dec!(80.89));
        assert_eq!(invoice.total(), invoice.subtotal());
    }

    #[test]
    fn test_recalculate_is_idempotent() {
        let mut invoice = draft_invoice();
        invoice
            .add_item(InvoiceItem::free_text("Line", 7, Money::new(dec!(1.11))).unwrap())
            .unwrap();

        invoice.recalculate_totals().unwrap();
        let first = invoice.total();
        invoice.recalculate_totals().unwrap();
        assert_eq!(invoice.total(), first);
    }

    #[test]
    fn test_submit_requires_draft() {
        let mut invoice = draft_invoice();
        invoice.submit().unwrap();
        assert_eq!(invoice.status(), InvoiceStatus::Pending);

        let err = invoice.submit().unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::InvalidTransition {
                action: "submit",
                status: InvoiceStatus::Pending
            }
        ));
    }

    #[test]
    fn test_proforma_shortcut() {
        let mut proforma = Invoice::new(
            TenantId::new(),
            "P-2026-000001",
            DocumentType::Proforma,
            ActorId::new(),
        );

        proforma.validate_proforma().unwrap();
        assert_eq!(proforma.status(), InvoiceStatus::Approved);
        assert!(proforma.approved_at().is_some());

        // Proformas never submit
        let mut other = Invoice::new(
            TenantId::new(),
            "P-2026-000002",
            DocumentType::Proforma,
            ActorId::new(),
        );
        assert!(other.submit().is_err());
    }

    #[test]
    fn test_items_lock_outside_draft() {
        let mut invoice = draft_invoice();
        invoice.submit().unwrap();

        let item = InvoiceItem::free_text("Late line", 1, Money::new(dec!(5.00))).unwrap();
        assert!(invoice.add_item(item).is_err());
    }

    #[test]
    fn test_modification_flow_unlocks_once() {
        let mut invoice = draft_invoice();
        invoice.submit().unwrap();
        invoice.approve().unwrap();

        invoice.request_modification().unwrap();
        // Second request while one is pending fails
        assert!(invoice.request_modification().is_err());

        invoice.approve_modification().unwrap();
        assert!(invoice.modification_requested_at().is_none());
        assert!(invoice.can_edit_items());

        let item = InvoiceItem::free_text("Amended", 1, Money::new(dec!(5.00))).unwrap();
        invoice.add_item(item).unwrap();

        // The unlock closes on the next status transition
        invoice.mark_paid().unwrap();
        assert!(!invoice.can_edit_items());

        // And the request can be raised again afterwards
        invoice.request_modification().unwrap();
    }

    #[test]
    fn test_approve_modification_without_request_fails() {
        let mut invoice = draft_invoice();
        invoice.submit().unwrap();
        invoice.approve().unwrap();

        assert!(invoice.approve_modification().is_err());
    }

    #[test]
    fn test_unpaid_only_from_paid() {
        let mut invoice = draft_invoice();
        invoice.submit().unwrap();
        invoice.approve().unwrap();

        // Approved invoices are never auto-reversed
        assert!(invoice.mark_unpaid().is_err());

        invoice.mark_paid().unwrap();
        invoice.mark_unpaid().unwrap();
        assert_eq!(invoice.status(), InvoiceStatus::Pending);
        assert!(invoice.paid_at().is_none());
    }

    #[test]
    fn test_status_and_type_serialize_snake_case() {
        assert_eq!(
            serde_json::to_string(&InvoiceStatus::Draft).unwrap(),
            "\"draft\""
        );
        assert_eq!(
            serde_json::to_string(&DocumentType::Proforma).unwrap(),
            "\"proforma\""
        );
    }

    #[test]
    fn test_approved_event_carries_lines() {
        let product_id = ProductId::new();
        let mut invoice = draft_invoice();
        invoice
            .add_item(InvoiceItem::for_product(product_id, "Widget", 10, Money::new(dec!(2.50))).unwrap())
            .unwrap();
        invoice.submit().unwrap();
        invoice.take_events();

        invoice.approve().unwrap();
        let events = invoice.take_events();
        assert_eq!(events[0].invoice_id(), invoice.id());
        match events.as_slice() {
            [InvoiceEvent::Approved { lines, .. }] => {
                assert_eq!(lines.len(), 1);
                assert_eq!(lines[0].product_id, Some(product_id));
                assert_eq!(lines[0].quantity, 10);
            }
            other => panic!("unexpected events: {other:?}"),
        }
    }
}
