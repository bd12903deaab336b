//! Inventory Domain - Stock Counters and Movement Ledger
//!
//! This crate models physical inventory as an authoritative per-product
//! counter reconciled by an append-only ledger of stock movements. The
//! counter is never written directly by business logic; it only moves when a
//! movement is posted, and every movement is immutable once recorded.
//!
//! # Ledger discipline
//!
//! - Deductions and reversals reference the invoice that caused them.
//! - A reversal restores exactly what the recorded deductions took, computed
//!   by netting the invoice's movements per product (see
//!   [`movement::outstanding_deductions`]).
//! - Counters may go negative; over-sell prevention is caller policy.

pub mod error;
pub mod movement;
pub mod product;

pub use error::InventoryError;
pub use movement::{outstanding_deductions, MovementKind, NewStockMovement, StockMovement};
pub use product::Product;
