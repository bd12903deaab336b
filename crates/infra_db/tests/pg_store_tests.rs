//! PostgreSQL integration tests
//!
//! These run against a real database and are ignored by default; point
//! `DATABASE_URL` at a disposable PostgreSQL instance and run with
//! `cargo test -p infra_db -- --ignored`.

use anyhow::Result;
use rust_decimal_macros::dec;

use core_kernel::{ActorId, Money, TenantId};
use domain_invoicing::{DocumentType, InvoiceItem, InvoiceStatus, InvoiceWorkflowEngine};
use infra_db::{
    create_pool, run_migrations, DatabaseConfig, DatabasePool, InvoiceRepository,
    MovementRepository, NewInvoice, PgWorkflowStore, ProductRepository,
};
use test_utils::TestProductBuilder;

async fn test_pool() -> Result<DatabasePool> {
    let config = DatabaseConfig::from_env()?.max_connections(5);
    let pool = create_pool(config).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database via DATABASE_URL"]
async fn product_round_trip() -> Result<()> {
    let pool = test_pool().await?;
    let tenant = TenantId::new_v7();

    let product = TestProductBuilder::new(tenant)
        .with_sku("SKU-RT-1")
        .with_quantity(12)
        .build();
    let products = ProductRepository::new(pool.clone());
    products.create(&product).await?;

    let loaded = products.find(tenant, product.id).await?;
    assert_eq!(loaded.quantity, 12);
    assert_eq!(loaded.sku, "SKU-RT-1");

    // cross-tenant read misses
    let miss = products.find(TenantId::new_v7(), product.id).await;
    assert!(miss.is_err());
    Ok(())
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database via DATABASE_URL"]
async fn invoice_numbers_are_sequential_per_tenant() -> Result<()> {
    let pool = test_pool().await?;
    let tenant = TenantId::new_v7();
    let invoices = InvoiceRepository::new(pool.clone());

    let first = invoices
        .create(NewInvoice {
            tenant_id: tenant,
            doc_type: DocumentType::Invoice,
            created_by: ActorId::new_v7(),
            items: vec![],
        })
        .await?;
    let second = invoices
        .create(NewInvoice {
            tenant_id: tenant,
            doc_type: DocumentType::Invoice,
            created_by: ActorId::new_v7(),
            items: vec![],
        })
        .await?;

    assert_eq!(first.number(), "000001");
    assert_eq!(second.number(), "000002");

    // point read round-trips, cross-tenant read misses
    let loaded = invoices.find(tenant, first.id()).await?;
    assert_eq!(loaded.status(), InvoiceStatus::Draft);
    assert_eq!(loaded.number(), "000001");
    assert!(invoices.find(TenantId::new_v7(), first.id()).await.is_err());
    Ok(())
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database via DATABASE_URL"]
async fn full_lifecycle_moves_stock_in_lockstep() -> Result<()> {
    let pool = test_pool().await?;
    let tenant = TenantId::new_v7();
    let actor = ActorId::new_v7();

    let product = TestProductBuilder::new(tenant)
        .with_sku("SKU-LC-1")
        .with_quantity(100)
        .build();
    let product_id = product.id;
    let products = ProductRepository::new(pool.clone());
    products.create(&product).await?;

    let invoices = InvoiceRepository::new(pool.clone());
    let invoice = invoices
        .create(NewInvoice {
            tenant_id: tenant,
            doc_type: DocumentType::Invoice,
            created_by: actor,
            items: vec![InvoiceItem::for_product(
                product_id,
                "Widget",
                10,
                Money::new(dec!(19.99)),
            )?],
        })
        .await?;
    let invoice_id = invoice.id();

    let engine = InvoiceWorkflowEngine::new(PgWorkflowStore::new(pool.clone()));

    engine.submit(tenant, invoice_id, actor).await?;
    assert_eq!(products.find(tenant, product_id).await?.quantity, 100);

    let approved = engine.approve(tenant, invoice_id, actor).await?;
    assert_eq!(approved.status(), InvoiceStatus::Approved);
    assert!(approved.stock_deducted_at().is_some());
    assert_eq!(products.find(tenant, product_id).await?.quantity, 90);

    engine.mark_paid(tenant, invoice_id, actor).await?;
    assert_eq!(products.find(tenant, product_id).await?.quantity, 90);

    let reverted = engine.mark_unpaid(tenant, invoice_id, actor).await?;
    assert_eq!(reverted.status(), InvoiceStatus::Pending);
    assert!(reverted.stock_deducted_at().is_none());
    assert_eq!(products.find(tenant, product_id).await?.quantity, 100);

    let trail = MovementRepository::new(pool.clone())
        .for_invoice(tenant, invoice_id)
        .await?;
    assert_eq!(trail.len(), 2);
    assert_eq!(trail[0].quantity_delta, -10);
    assert_eq!(trail[1].quantity_delta, 10);
    Ok(())
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database via DATABASE_URL"]
async fn concurrent_approvals_deduct_once() -> Result<()> {
    let pool = test_pool().await?;
    let tenant = TenantId::new_v7();
    let actor = ActorId::new_v7();

    let product = TestProductBuilder::new(tenant)
        .with_sku("SKU-CC-1")
        .with_quantity(100)
        .build();
    let product_id = product.id;
    let products = ProductRepository::new(pool.clone());
    products.create(&product).await?;

    let invoices = InvoiceRepository::new(pool.clone());
    let invoice = invoices
        .create(NewInvoice {
            tenant_id: tenant,
            doc_type: DocumentType::Invoice,
            created_by: actor,
            items: vec![InvoiceItem::for_product(
                product_id,
                "Widget",
                10,
                Money::new(dec!(5.00)),
            )?],
        })
        .await?;
    let invoice_id = invoice.id();

    let engine = InvoiceWorkflowEngine::new(PgWorkflowStore::new(pool.clone()));
    engine.submit(tenant, invoice_id, actor).await?;

    // race two approvals; the row lock serializes them and the loser hits
    // the status guard
    let engine_a = InvoiceWorkflowEngine::new(PgWorkflowStore::new(pool.clone()));
    let engine_b = InvoiceWorkflowEngine::new(PgWorkflowStore::new(pool.clone()));
    let (a, b) = tokio::join!(
        engine_a.approve(tenant, invoice_id, actor),
        engine_b.approve(tenant, invoice_id, actor),
    );
    assert!(a.is_ok() ^ b.is_ok());
    assert_eq!(products.find(tenant, product_id).await?.quantity, 90);
    Ok(())
}
