//! Product stock counters
//!
//! A product's `quantity` is the authoritative on-hand count. It is adjusted
//! exclusively through ledger postings applied by a store implementation; the
//! invoicing domain never decrements it directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Money, ProductId, TenantId, TenantScoped};

/// A catalog product with its running stock counter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier
    pub id: ProductId,
    /// Owning tenant
    pub tenant_id: TenantId,
    /// Stock-keeping unit code
    pub sku: String,
    /// Display name
    pub name: String,
    /// On-hand count, reconciled by the movement ledger
    pub quantity: i64,
    /// Advisory low-stock threshold
    pub min_quantity: i64,
    /// Default sale price
    pub unit_price: Money,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Creates a new product with an initial counter
    pub fn new(
        tenant_id: TenantId,
        sku: impl Into<String>,
        name: impl Into<String>,
        quantity: i64,
        unit_price: Money,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ProductId::new_v7(),
            tenant_id,
            sku: sku.into(),
            name: name.into(),
            quantity,
            min_quantity: 0,
            unit_price,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the advisory low-stock threshold
    pub fn with_min_quantity(mut self, min_quantity: i64) -> Self {
        self.min_quantity = min_quantity;
        self
    }

    /// Returns true when the counter sits at or below the advisory threshold
    pub fn is_below_minimum(&self) -> bool {
        self.quantity <= self.min_quantity
    }

    /// Applies a signed ledger delta to the counter
    ///
    /// Store implementations call this when posting a movement; the counter
    /// may go negative.
    pub fn apply_delta(&mut self, delta: i64) {
        self.quantity += delta;
        self.updated_at = Utc::now();
    }
}

impl TenantScoped for Product {
    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}
