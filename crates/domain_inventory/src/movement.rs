//! Stock movement ledger entries
//!
//! Movements are the append-only audit trail behind every counter change.
//! Entries are immutable once posted and weakly reference the invoice that
//! caused them: deleting an invoice never deletes its movement history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use core_kernel::{ActorId, InvoiceId, ProductId, StockMovementId, TenantId, TenantScoped};

use crate::error::InventoryError;

/// Classification of a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// Stock committed to a sale at invoice approval
    SaleDeduction,
    /// Restoration of a prior sale deduction
    SaleReversal,
    /// Manual correction posted by an operator
    Adjustment,
}

impl MovementKind {
    /// Stable string form used in persistence
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::SaleDeduction => "sale_deduction",
            MovementKind::SaleReversal => "sale_reversal",
            MovementKind::Adjustment => "adjustment",
        }
    }

    /// Parses the stable string form
    pub fn parse(s: &str) -> Result<Self, InventoryError> {
        match s {
            "sale_deduction" => Ok(MovementKind::SaleDeduction),
            "sale_reversal" => Ok(MovementKind::SaleReversal),
            "adjustment" => Ok(MovementKind::Adjustment),
            other => Err(InventoryError::UnknownMovementKind(other.to_string())),
        }
    }
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable ledger entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMovement {
    /// Unique identifier
    pub id: StockMovementId,
    /// Owning tenant
    pub tenant_id: TenantId,
    /// Product whose counter moved
    pub product_id: ProductId,
    /// Originating invoice, when the movement came from the sale lifecycle
    pub invoice_id: Option<InvoiceId>,
    /// Entry classification
    pub kind: MovementKind,
    /// Signed counter delta
    pub quantity_delta: i64,
    /// Actor that triggered the posting
    pub actor_id: ActorId,
    /// Posting timestamp
    pub created_at: DateTime<Utc>,
}

impl TenantScoped for StockMovement {
    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}

/// Data for a movement about to be posted
#[derive(Debug, Clone)]
pub struct NewStockMovement {
    pub tenant_id: TenantId,
    pub product_id: ProductId,
    pub invoice_id: Option<InvoiceId>,
    pub kind: MovementKind,
    pub quantity_delta: i64,
    pub actor_id: ActorId,
}

impl NewStockMovement {
    /// A sale deduction of `quantity` units tied to an invoice
    ///
    /// # Errors
    ///
    /// Returns `InvalidQuantity` when `quantity` is not positive.
    pub fn sale_deduction(
        tenant_id: TenantId,
        product_id: ProductId,
        invoice_id: InvoiceId,
        quantity: i64,
        actor_id: ActorId,
    ) -> Result<Self, InventoryError> {
        if quantity <= 0 {
            return Err(InventoryError::InvalidQuantity(quantity));
        }
        Ok(Self {
            tenant_id,
            product_id,
            invoice_id: Some(invoice_id),
            kind: MovementKind::SaleDeduction,
            quantity_delta: -quantity,
            actor_id,
        })
    }

    /// A reversal restoring `quantity` units previously deducted for an invoice
    ///
    /// # Errors
    ///
    /// Returns `InvalidQuantity` when `quantity` is not positive.
    pub fn sale_reversal(
        tenant_id: TenantId,
        product_id: ProductId,
        invoice_id: InvoiceId,
        quantity: i64,
        actor_id: ActorId,
    ) -> Result<Self, InventoryError> {
        if quantity <= 0 {
            return Err(InventoryError::InvalidQuantity(quantity));
        }
        Ok(Self {
            tenant_id,
            product_id,
            invoice_id: Some(invoice_id),
            kind: MovementKind::SaleReversal,
            quantity_delta: quantity,
            actor_id,
        })
    }

    /// Materializes the posted entry with identity and timestamp
    pub fn into_movement(self) -> StockMovement {
        StockMovement {
            id: StockMovementId::new_v7(),
            tenant_id: self.tenant_id,
            product_id: self.product_id,
            invoice_id: self.invoice_id,
            kind: self.kind,
            quantity_delta: self.quantity_delta,
            actor_id: self.actor_id,
            created_at: Utc::now(),
        }
    }
}

/// Nets an invoice's sale movements per product
///
/// Returns, for each product, the quantity still deducted and not yet
/// reversed (always non-negative). A reversal posts exactly these amounts
/// back, so restores are computed from the recorded ledger rather than from
/// line items that may have been edited since the deduction.
pub fn outstanding_deductions(movements: &[StockMovement]) -> HashMap<ProductId, i64> {
    let mut net: HashMap<ProductId, i64> = HashMap::new();
    for movement in movements {
        match movement.kind {
            MovementKind::SaleDeduction | MovementKind::SaleReversal => {
                *net.entry(movement.product_id).or_insert(0) += movement.quantity_delta;
            }
            MovementKind::Adjustment => {}
        }
    }
    net.retain(|_, delta| *delta != 0);
    net.into_iter().map(|(id, delta)| (id, -delta)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movement(
        product_id: ProductId,
        kind: MovementKind,
        delta: i64,
        invoice: InvoiceId,
    ) -> StockMovement {
        StockMovement {
            id: StockMovementId::new_v7(),
            tenant_id: TenantId::new(),
            product_id,
            invoice_id: Some(invoice),
            kind,
            quantity_delta: delta,
            actor_id: ActorId::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_deduction_requires_positive_quantity() {
        let result = NewStockMovement::sale_deduction(
            TenantId::new(),
            ProductId::new(),
            InvoiceId::new(),
            0,
            ActorId::new(),
        );
        assert!(matches!(result, Err(InventoryError::InvalidQuantity(0))));
    }

    #[test]
    fn test_outstanding_after_single_deduction() {
        let product = ProductId::new();
        let invoice = InvoiceId::new();
        let ledger = vec![movement(product, MovementKind::SaleDeduction, -10, invoice)];

        let net = outstanding_deductions(&ledger);
        assert_eq!(net.get(&product), Some(&10));
    }

    #[test]
    fn test_reversed_deduction_nets_to_zero() {
        let product = ProductId::new();
        let invoice = InvoiceId::new();
        let ledger = vec![
            movement(product, MovementKind::SaleDeduction, -10, invoice),
            movement(product, MovementKind::SaleReversal, 10, invoice),
        ];

        let net = outstanding_deductions(&ledger);
        assert!(net.is_empty());
    }

    #[test]
    fn test_second_cycle_nets_only_latest_deduction() {
        let product = ProductId::new();
        let invoice = InvoiceId::new();
        let ledger = vec![
            movement(product, MovementKind::SaleDeduction, -10, invoice),
            movement(product, MovementKind::SaleReversal, 10, invoice),
            movement(product, MovementKind::SaleDeduction, -4, invoice),
        ];

        let net = outstanding_deductions(&ledger);
        assert_eq!(net.get(&product), Some(&4));
    }

    #[test]
    fn test_adjustments_are_ignored() {
        let product = ProductId::new();
        let invoice = InvoiceId::new();
        let ledger = vec![
            movement(product, MovementKind::SaleDeduction, -10, invoice),
            movement(product, MovementKind::Adjustment, 3, invoice),
        ];

        let net = outstanding_deductions(&ledger);
        assert_eq!(net.get(&product), Some(&10));
    }

    #[test]
    fn test_kind_round_trips_through_stable_string() {
        for kind in [
            MovementKind::SaleDeduction,
            MovementKind::SaleReversal,
            MovementKind::Adjustment,
        ] {
            assert_eq!(MovementKind::parse(kind.as_str()).unwrap(), kind);
        }
    }
}
