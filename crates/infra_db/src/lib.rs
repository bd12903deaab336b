//! Infrastructure Database Layer
//!
//! PostgreSQL adapter for the billing core, built on SQLx.
//!
//! # Architecture
//!
//! Two access paths share one schema:
//!
//! - [`PgWorkflowStore`] implements the workflow engine's unit-of-work ports.
//!   Each lifecycle operation runs in one transaction with the invoice row
//!   locked `FOR UPDATE` and product counters moved by atomic increments.
//! - The repositories cover the creation/read surface used by the request
//!   layer (drafting invoices, registering products, auditing movements).
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, DatabaseConfig, PgWorkflowStore};
//!
//! let pool = create_pool(DatabaseConfig::from_env()?).await?;
//! infra_db::run_migrations(&pool).await?;
//! let store = PgWorkflowStore::new(pool);
//! ```

pub mod error;
pub mod pool;
pub mod repositories;
pub mod store;

pub use error::DatabaseError;
pub use pool::{create_pool, run_migrations, DatabaseConfig, DatabasePool};
pub use repositories::{InvoiceRepository, MovementRepository, NewInvoice, ProductRepository};
pub use store::{PgWorkflowStore, PgWorkflowTx};
