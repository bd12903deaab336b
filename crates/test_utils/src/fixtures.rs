//! Pre-built test data for common entities

use core_kernel::{ActorId, Money, TenantId};
use rust_decimal_macros::dec;

/// Monetary fixtures
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// A typical unit price
    pub fn unit_price() -> Money {
        Money::new(dec!(19.99))
    }

    /// A price that exercises cent truncation when multiplied
    pub fn awkward_price() -> Money {
        Money::new(dec!(0.33))
    }

    pub fn zero() -> Money {
        Money::zero()
    }
}

/// Identifier fixtures
pub struct IdFixtures;

impl IdFixtures {
    pub fn tenant_id() -> TenantId {
        TenantId::new_v7()
    }

    pub fn actor_id() -> ActorId {
        ActorId::new_v7()
    }
}

/// String fixtures
pub struct StringFixtures;

impl StringFixtures {
    pub fn invoice_number() -> &'static str {
        "2026-000001"
    }

    pub fn proforma_number() -> &'static str {
        "P-2026-000001"
    }

    pub fn sku() -> &'static str {
        "SKU-0001"
    }
}
