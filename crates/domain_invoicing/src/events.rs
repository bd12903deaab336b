//! Invoicing domain events
//!
//! Events are accumulated on the aggregate during a transition and drained by
//! the caller after commit, so that projections (delivery notes,
//! notifications) only ever observe committed state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{InvoiceId, ProductId, TenantId};

/// A line captured at the moment an invoice was committed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedLine {
    pub product_id: Option<ProductId>,
    pub description: String,
    pub quantity: i64,
}

/// Events emitted by the invoice lifecycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum InvoiceEvent {
    /// Draft invoice submitted for approval
    Submitted {
        invoice_id: InvoiceId,
        tenant_id: TenantId,
        timestamp: DateTime<Utc>,
    },

    /// Proforma reached its terminal validated state
    ProformaValidated {
        invoice_id: InvoiceId,
        tenant_id: TenantId,
        timestamp: DateTime<Utc>,
    },

    /// Invoice approved; the sale is committed inventory-wise
    Approved {
        invoice_id: InvoiceId,
        tenant_id: TenantId,
        number: String,
        lines: Vec<CommittedLine>,
        timestamp: DateTime<Utc>,
    },

    /// Invoice settled
    MarkedPaid {
        invoice_id: InvoiceId,
        timestamp: DateTime<Utc>,
    },

    /// Payment reversed; invoice back to pending
    MarkedUnpaid {
        invoice_id: InvoiceId,
        timestamp: DateTime<Utc>,
    },

    /// Modification requested on a committed document
    ModificationRequested {
        invoice_id: InvoiceId,
        timestamp: DateTime<Utc>,
    },

    /// Modification granted; items unlocked for one cycle
    ModificationApproved {
        invoice_id: InvoiceId,
        timestamp: DateTime<Utc>,
    },
}

impl InvoiceEvent {
    /// The invoice this event belongs to
    pub fn invoice_id(&self) -> InvoiceId {
        match self {
            InvoiceEvent::Submitted { invoice_id, .. }
            | InvoiceEvent::ProformaValidated { invoice_id, .. }
            | InvoiceEvent::Approved { invoice_id, .. }
            | InvoiceEvent::MarkedPaid { invoice_id, .. }
            | InvoiceEvent::MarkedUnpaid { invoice_id, .. }
            | InvoiceEvent::ModificationRequested { invoice_id, .. }
            | InvoiceEvent::ModificationApproved { invoice_id, .. } => *invoice_id,
        }
    }
}
