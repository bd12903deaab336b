//! Invoice repository implementation
//!
//! Creation and point reads for invoice aggregates. Numbers are allocated
//! sequentially per tenant from `invoice_sequences` inside the creation
//! transaction, so two concurrent creations can never share a number.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use core_kernel::{ActorId, InvoiceId, Money, TenantId};
use domain_invoicing::{DocumentType, Invoice, InvoiceItem, InvoiceStatus};

use crate::error::DatabaseError;

/// Database row for an invoice
#[derive(Debug, Clone, FromRow)]
pub(crate) struct InvoiceRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub number: String,
    pub doc_type: String,
    pub status: String,
    pub subtotal: Decimal,
    pub total: Decimal,
    pub approved_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub stock_deducted_at: Option<DateTime<Utc>>,
    pub modification_requested_at: Option<DateTime<Utc>>,
    pub items_unlocked: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database row for an invoice line item
#[derive(Debug, Clone, FromRow)]
pub(crate) struct InvoiceItemRow {
    pub id: Uuid,
    pub product_id: Option<Uuid>,
    pub description: String,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

const INVOICE_COLUMNS: &str = "id, tenant_id, number, doc_type, status, subtotal, total, \
     approved_at, paid_at, stock_deducted_at, modification_requested_at, \
     items_unlocked, created_by, created_at, updated_at";

/// Maps rows back into the aggregate
pub(crate) fn hydrate(row: InvoiceRow, items: Vec<InvoiceItemRow>) -> Result<Invoice, DatabaseError> {
    let doc_type = DocumentType::parse(&row.doc_type)
        .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;
    let status = InvoiceStatus::parse(&row.status)
        .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;

    let items = items
        .into_iter()
        .map(|item| InvoiceItem {
            id: item.id.into(),
            product_id: item.product_id.map(Into::into),
            description: item.description,
            quantity: item.quantity,
            unit_price: Money::new(item.unit_price),
            line_total: Money::new(item.line_total),
        })
        .collect();

    Ok(Invoice::from_stored(
        row.id.into(),
        row.tenant_id.into(),
        row.number,
        doc_type,
        status,
        Money::new(row.subtotal),
        Money::new(row.total),
        row.approved_at,
        row.paid_at,
        row.stock_deducted_at,
        row.modification_requested_at,
        row.items_unlocked,
        row.created_by.into(),
        items,
        row.created_at,
        row.updated_at,
    ))
}

pub(crate) async fn fetch_invoice(
    conn: &mut PgConnection,
    tenant: TenantId,
    id: InvoiceId,
    for_update: bool,
) -> Result<Option<InvoiceRow>, DatabaseError> {
    let suffix = if for_update { " FOR UPDATE" } else { "" };
    let sql = format!(
        "SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = $1 AND tenant_id = $2{suffix}"
    );
    let row = sqlx::query_as::<_, InvoiceRow>(&sql)
        .bind(id.as_uuid())
        .bind(tenant.as_uuid())
        .fetch_optional(conn)
        .await?;
    Ok(row)
}

pub(crate) async fn fetch_items(
    conn: &mut PgConnection,
    id: InvoiceId,
) -> Result<Vec<InvoiceItemRow>, DatabaseError> {
    let rows = sqlx::query_as::<_, InvoiceItemRow>(
        "SELECT id, product_id, description, quantity, unit_price, line_total \
         FROM invoice_items WHERE invoice_id = $1 ORDER BY position",
    )
    .bind(id.as_uuid())
    .fetch_all(conn)
    .await?;
    Ok(rows)
}

pub(crate) async fn insert_invoice(
    conn: &mut PgConnection,
    invoice: &Invoice,
) -> Result<(), DatabaseError> {
    sqlx::query(
        "INSERT INTO invoices (id, tenant_id, number, doc_type, status, subtotal, total, \
         approved_at, paid_at, stock_deducted_at, modification_requested_at, items_unlocked, \
         created_by, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
    )
    .bind(invoice.id().as_uuid())
    .bind(core_kernel::TenantScoped::tenant_id(invoice).as_uuid())
    .bind(invoice.number())
    .bind(invoice.doc_type().as_str())
    .bind(invoice.status().as_str())
    .bind(invoice.subtotal().amount())
    .bind(invoice.total().amount())
    .bind(invoice.approved_at())
    .bind(invoice.paid_at())
    .bind(invoice.stock_deducted_at())
    .bind(invoice.modification_requested_at())
    .bind(invoice.items_unlocked())
    .bind(invoice.created_by().as_uuid())
    .bind(invoice.created_at())
    .bind(invoice.updated_at())
    .execute(conn)
    .await?;
    Ok(())
}

pub(crate) async fn update_invoice(
    conn: &mut PgConnection,
    invoice: &Invoice,
) -> Result<u64, DatabaseError> {
    let result = sqlx::query(
        "UPDATE invoices SET status = $3, subtotal = $4, total = $5, approved_at = $6, \
         paid_at = $7, stock_deducted_at = $8, modification_requested_at = $9, \
         items_unlocked = $10, updated_at = $11 \
         WHERE id = $1 AND tenant_id = $2",
    )
    .bind(invoice.id().as_uuid())
    .bind(core_kernel::TenantScoped::tenant_id(invoice).as_uuid())
    .bind(invoice.status().as_str())
    .bind(invoice.subtotal().amount())
    .bind(invoice.total().amount())
    .bind(invoice.approved_at())
    .bind(invoice.paid_at())
    .bind(invoice.stock_deducted_at())
    .bind(invoice.modification_requested_at())
    .bind(invoice.items_unlocked())
    .bind(invoice.updated_at())
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

pub(crate) async fn replace_items(
    conn: &mut PgConnection,
    invoice: &Invoice,
) -> Result<(), DatabaseError> {
    sqlx::query("DELETE FROM invoice_items WHERE invoice_id = $1")
        .bind(invoice.id().as_uuid())
        .execute(&mut *conn)
        .await?;

    for (position, item) in invoice.items().iter().enumerate() {
        sqlx::query(
            "INSERT INTO invoice_items (id, invoice_id, product_id, description, quantity, \
             unit_price, line_total, position) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(item.id.as_uuid())
        .bind(invoice.id().as_uuid())
        .bind(item.product_id.map(|id| *id.as_uuid()))
        .bind(&item.description)
        .bind(item.quantity)
        .bind(item.unit_price.amount())
        .bind(item.line_total.amount())
        .bind(position as i32)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Allocates the next sequential number for a tenant
pub(crate) async fn next_number(
    conn: &mut PgConnection,
    tenant: TenantId,
) -> Result<i64, DatabaseError> {
    let (allocated,): (i64,) = sqlx::query_as(
        "INSERT INTO invoice_sequences (tenant_id, next_number) VALUES ($1, 2) \
         ON CONFLICT (tenant_id) DO UPDATE SET next_number = invoice_sequences.next_number + 1 \
         RETURNING next_number - 1",
    )
    .bind(tenant.as_uuid())
    .fetch_one(conn)
    .await?;
    Ok(allocated)
}

/// Data for creating a new invoice
#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub tenant_id: TenantId,
    pub doc_type: DocumentType,
    pub created_by: ActorId,
    pub items: Vec<InvoiceItem>,
}

/// Repository for invoice creation and point reads
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: PgPool,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a draft invoice, allocating its per-tenant number
    pub async fn create(&self, new: NewInvoice) -> Result<Invoice, DatabaseError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;

        let sequence = next_number(&mut tx, new.tenant_id).await?;
        let number = match new.doc_type {
            DocumentType::Invoice => format!("{sequence:06}"),
            DocumentType::Proforma => format!("P-{sequence:06}"),
        };

        let mut invoice = Invoice::new(new.tenant_id, number, new.doc_type, new.created_by);
        for item in new.items {
            invoice
                .add_item(item)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?;
        }
        invoice.take_events();

        insert_invoice(&mut tx, &invoice).await?;
        replace_items(&mut tx, &invoice).await?;

        tx.commit().await.map_err(DatabaseError::from)?;
        Ok(invoice)
    }

    /// Fetches an invoice with its items
    ///
    /// # Errors
    ///
    /// `NotFound` when absent or owned by another tenant.
    pub async fn find(&self, tenant: TenantId, id: InvoiceId) -> Result<Invoice, DatabaseError> {
        let mut conn = self.pool.acquire().await.map_err(DatabaseError::from)?;

        let row = fetch_invoice(&mut conn, tenant, id, false)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Invoice", id))?;
        let items = fetch_items(&mut conn, id).await?;
        hydrate(row, items)
    }
}
