//! Stock movement repository implementation
//!
//! Read-only audit access to the movement ledger. Postings happen inside the
//! workflow store's transaction; nothing here mutates.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use core_kernel::{InvoiceId, TenantId};
use domain_inventory::{MovementKind, StockMovement};

use crate::error::DatabaseError;

/// Database row for a stock movement
#[derive(Debug, Clone, FromRow)]
pub(crate) struct MovementRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub product_id: Uuid,
    pub invoice_id: Option<Uuid>,
    pub kind: String,
    pub quantity_delta: i64,
    pub actor_id: Uuid,
    pub created_at: DateTime<Utc>,
}

pub(crate) fn hydrate(row: MovementRow) -> Result<StockMovement, DatabaseError> {
    let kind = MovementKind::parse(&row.kind)
        .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;
    Ok(StockMovement {
        id: row.id.into(),
        tenant_id: row.tenant_id.into(),
        product_id: row.product_id.into(),
        invoice_id: row.invoice_id.map(Into::into),
        kind,
        quantity_delta: row.quantity_delta,
        actor_id: row.actor_id.into(),
        created_at: row.created_at,
    })
}

pub(crate) async fn fetch_for_invoice(
    conn: &mut PgConnection,
    tenant: TenantId,
    invoice: InvoiceId,
) -> Result<Vec<StockMovement>, DatabaseError> {
    let rows = sqlx::query_as::<_, MovementRow>(
        "SELECT id, tenant_id, product_id, invoice_id, kind, quantity_delta, actor_id, \
         created_at FROM stock_movements WHERE invoice_id = $1 AND tenant_id = $2 \
         ORDER BY created_at, id",
    )
    .bind(invoice.as_uuid())
    .bind(tenant.as_uuid())
    .fetch_all(conn)
    .await?;

    rows.into_iter().map(hydrate).collect()
}

pub(crate) async fn insert_movement(
    conn: &mut PgConnection,
    movement: &StockMovement,
) -> Result<(), DatabaseError> {
    sqlx::query(
        "INSERT INTO stock_movements (id, tenant_id, product_id, invoice_id, kind, \
         quantity_delta, actor_id, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(movement.id.as_uuid())
    .bind(movement.tenant_id.as_uuid())
    .bind(movement.product_id.as_uuid())
    .bind(movement.invoice_id.map(|id| *id.as_uuid()))
    .bind(movement.kind.as_str())
    .bind(movement.quantity_delta)
    .bind(movement.actor_id.as_uuid())
    .bind(movement.created_at)
    .execute(conn)
    .await?;
    Ok(())
}

/// Repository exposing the movement audit trail
#[derive(Debug, Clone)]
pub struct MovementRepository {
    pool: PgPool,
}

impl MovementRepository {
    /// Creates a new MovementRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The ordered movement history of an invoice
    pub async fn for_invoice(
        &self,
        tenant: TenantId,
        invoice: InvoiceId,
    ) -> Result<Vec<StockMovement>, DatabaseError> {
        let mut conn = self.pool.acquire().await.map_err(DatabaseError::from)?;
        fetch_for_invoice(&mut conn, tenant, invoice).await
    }
}
