//! Delivery note projection
//!
//! Shipping documents are derived from the committed lifecycle: once an
//! invoice is approved, a delivery note can be cut from the lines captured in
//! the approval event. Proforma validation never ships goods, so it projects
//! to nothing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{DeliveryNoteId, InvoiceId, ProductId, TenantId, TenantScoped};

use crate::events::InvoiceEvent;

/// A line on a delivery note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryLine {
    pub product_id: Option<ProductId>,
    pub description: String,
    pub quantity: i64,
}

/// A shipping document derived from an approved invoice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryNote {
    pub id: DeliveryNoteId,
    pub tenant_id: TenantId,
    pub invoice_id: InvoiceId,
    /// Derived from the invoice number
    pub number: String,
    pub lines: Vec<DeliveryLine>,
    pub issued_at: DateTime<Utc>,
}

impl TenantScoped for DeliveryNote {
    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}

/// Projects delivery notes from invoice lifecycle events
#[derive(Debug, Clone, Copy, Default)]
pub struct DeliveryNoteProjector;

impl DeliveryNoteProjector {
    pub fn new() -> Self {
        Self
    }

    /// Derives a delivery note from a committed event, if one applies
    pub fn project(&self, event: &InvoiceEvent) -> Option<DeliveryNote> {
        match event {
            InvoiceEvent::Approved {
                invoice_id,
                tenant_id,
                number,
                lines,
                timestamp,
            } => Some(DeliveryNote {
                id: DeliveryNoteId::new_v7(),
                tenant_id: *tenant_id,
                invoice_id: *invoice_id,
                number: format!("DN-{number}"),
                lines: lines
                    .iter()
                    .map(|line| DeliveryLine {
                        product_id: line.product_id,
                        description: line.description.clone(),
                        quantity: line.quantity,
                    })
                    .collect(),
                issued_at: *timestamp,
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::CommittedLine;

    #[test]
    fn test_projects_from_approval() {
        let projector = DeliveryNoteProjector::new();
        let invoice_id = InvoiceId::new();
        let event = InvoiceEvent::Approved {
            invoice_id,
            tenant_id: TenantId::new(),
            number: "2026-000042".to_string(),
            lines: vec![CommittedLine {
                product_id: Some(ProductId::new()),
                description: "Widget".to_string(),
                quantity: 4,
            }],
            timestamp: Utc::now(),
        };

        let note = projector.project(&event).unwrap();
        assert_eq!(note.invoice_id, invoice_id);
        assert_eq!(note.number, "DN-2026-000042");
        assert_eq!(note.lines.len(), 1);
    }

    #[test]
    fn test_ignores_proforma_validation() {
        let projector = DeliveryNoteProjector::new();
        let event = InvoiceEvent::ProformaValidated {
            invoice_id: InvoiceId::new(),
            tenant_id: TenantId::new(),
            timestamp: Utc::now(),
        };

        assert!(projector.project(&event).is_none());
    }
}
