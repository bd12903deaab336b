//! Product repository implementation
//!
//! Catalog-side creation and point reads. The stock counter itself is only
//! ever moved by ledger postings in the workflow store.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use core_kernel::{Money, ProductId, TenantId};
use domain_inventory::Product;

use crate::error::DatabaseError;

/// Database row for a product
#[derive(Debug, Clone, FromRow)]
pub(crate) struct ProductRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub sku: String,
    pub name: String,
    pub quantity: i64,
    pub min_quantity: i64,
    pub unit_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub(crate) fn hydrate(row: ProductRow) -> Product {
    Product {
        id: row.id.into(),
        tenant_id: row.tenant_id.into(),
        sku: row.sku,
        name: row.name,
        quantity: row.quantity,
        min_quantity: row.min_quantity,
        unit_price: Money::new(row.unit_price),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

pub(crate) async fn fetch_product(
    conn: &mut PgConnection,
    tenant: TenantId,
    id: ProductId,
) -> Result<Option<ProductRow>, DatabaseError> {
    let row = sqlx::query_as::<_, ProductRow>(
        "SELECT id, tenant_id, sku, name, quantity, min_quantity, unit_price, created_at, \
         updated_at FROM products WHERE id = $1 AND tenant_id = $2",
    )
    .bind(id.as_uuid())
    .bind(tenant.as_uuid())
    .fetch_optional(conn)
    .await?;
    Ok(row)
}

/// Repository for product creation and point reads
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    /// Creates a new ProductRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a product
    pub async fn create(&self, product: &Product) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO products (id, tenant_id, sku, name, quantity, min_quantity, \
             unit_price, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(product.id.as_uuid())
        .bind(product.tenant_id.as_uuid())
        .bind(&product.sku)
        .bind(&product.name)
        .bind(product.quantity)
        .bind(product.min_quantity)
        .bind(product.unit_price.amount())
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Fetches a product
    ///
    /// # Errors
    ///
    /// `NotFound` when absent or owned by another tenant.
    pub async fn find(&self, tenant: TenantId, id: ProductId) -> Result<Product, DatabaseError> {
        let mut conn = self.pool.acquire().await.map_err(DatabaseError::from)?;
        let row = fetch_product(&mut conn, tenant, id)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Product", id))?;
        Ok(hydrate(row))
    }
}
