//! Invoicing Domain - Lifecycle Workflow and Stock Synchronization
//!
//! This crate implements the invoice lifecycle state machine and keeps the
//! physical inventory count consistent with it. The hard invariant: stock is
//! decremented exactly once per invoice, at the moment the invoice becomes
//! financially committed (approval), and restored exactly once if that
//! commitment is reversed (un-payment).
//!
//! # Lifecycle
//!
//! ```text
//! Draft ──submit──▶ Pending ──approve──▶ Approved ──mark_paid──▶ Paid
//!                      ▲                    │ stock deducted       │
//!                      └────── mark_unpaid (stock restored) ───────┘
//! ```
//!
//! Proformas take `Draft → Approved` via `validate_proforma` and never touch
//! stock. A modification sub-flow overlays `Approved`/`Paid`:
//! `request_modification` marks the document, `approve_modification` unlocks
//! item editing for one cycle.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_invoicing::{InvoiceWorkflowEngine, WorkflowStore};
//!
//! let engine = InvoiceWorkflowEngine::new(store);
//! let invoice = engine.submit(tenant, invoice_id, actor).await?;
//! let invoice = engine.approve(tenant, invoice_id, actor).await?;
//! assert!(invoice.stock_deducted_at().is_some());
//! ```

pub mod delivery;
pub mod engine;
pub mod error;
pub mod events;
pub mod invoice;
pub mod store;

pub use delivery::{DeliveryLine, DeliveryNote, DeliveryNoteProjector};
pub use engine::{InvoiceWorkflowEngine, RetryPolicy};
pub use error::WorkflowError;
pub use events::{CommittedLine, InvoiceEvent};
pub use invoice::{DocumentType, Invoice, InvoiceItem, InvoiceStatus};
pub use store::{WorkflowStore, WorkflowTx};
