//! Test Data Builders
//!
//! Builder patterns for constructing test data with sensible defaults. Tests
//! specify only the relevant fields and take defaults for everything else.

use fake::faker::lorem::en::Word;
use fake::Fake;

use core_kernel::{ActorId, Money, ProductId, TenantId};
use domain_inventory::Product;
use domain_invoicing::{DocumentType, Invoice, InvoiceItem, WorkflowError};

use crate::fixtures::{MoneyFixtures, StringFixtures};

/// Builder for test products
pub struct TestProductBuilder {
    tenant_id: TenantId,
    sku: String,
    name: String,
    quantity: i64,
    min_quantity: i64,
    unit_price: Money,
}

impl TestProductBuilder {
    /// Creates a builder with default values
    pub fn new(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            sku: StringFixtures::sku().to_string(),
            name: Word().fake(),
            quantity: 100,
            min_quantity: 0,
            unit_price: MoneyFixtures::unit_price(),
        }
    }

    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = sku.into();
        self
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_min_quantity(mut self, min_quantity: i64) -> Self {
        self.min_quantity = min_quantity;
        self
    }

    pub fn with_unit_price(mut self, unit_price: Money) -> Self {
        self.unit_price = unit_price;
        self
    }

    pub fn build(self) -> Product {
        Product::new(
            self.tenant_id,
            self.sku,
            self.name,
            self.quantity,
            self.unit_price,
        )
        .with_min_quantity(self.min_quantity)
    }
}

/// Builder for test invoices
///
/// Builds a draft; tests drive it through the lifecycle themselves.
pub struct TestInvoiceBuilder {
    tenant_id: TenantId,
    number: String,
    doc_type: DocumentType,
    created_by: ActorId,
    items: Vec<InvoiceItem>,
}

impl TestInvoiceBuilder {
    /// Creates a builder for a stock-committing invoice
    pub fn invoice(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            number: StringFixtures::invoice_number().to_string(),
            doc_type: DocumentType::Invoice,
            created_by: ActorId::new_v7(),
            items: Vec::new(),
        }
    }

    /// Creates a builder for a proforma
    pub fn proforma(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            number: StringFixtures::proforma_number().to_string(),
            doc_type: DocumentType::Proforma,
            created_by: ActorId::new_v7(),
            items: Vec::new(),
        }
    }

    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.number = number.into();
        self
    }

    pub fn with_created_by(mut self, actor: ActorId) -> Self {
        self.created_by = actor;
        self
    }

    /// Adds a product-bearing line
    pub fn with_product_line(
        mut self,
        product_id: ProductId,
        quantity: i64,
        unit_price: Money,
    ) -> Result<Self, WorkflowError> {
        let description: String = Word().fake();
        self.items.push(InvoiceItem::for_product(
            product_id,
            description,
            quantity,
            unit_price,
        )?);
        Ok(self)
    }

    /// Adds a free-text line with no stock effect
    pub fn with_free_text_line(
        mut self,
        description: impl Into<String>,
        quantity: i64,
        unit_price: Money,
    ) -> Result<Self, WorkflowError> {
        self.items
            .push(InvoiceItem::free_text(description, quantity, unit_price)?);
        Ok(self)
    }

    pub fn build(self) -> Result<Invoice, WorkflowError> {
        let mut invoice = Invoice::new(self.tenant_id, self.number, self.doc_type, self.created_by);
        for item in self.items {
            invoice.add_item(item)?;
        }
        // Drafts start clean for event assertions
        invoice.take_events();
        Ok(invoice)
    }
}
