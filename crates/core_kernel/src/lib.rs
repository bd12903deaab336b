//! Core Kernel - Foundational types and utilities for the billing system
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money with precise decimal arithmetic and deterministic cent truncation
//! - Strongly-typed identifiers
//! - Tenant scoping primitives

pub mod error;
pub mod identifiers;
pub mod money;
pub mod tenant;

pub use error::CoreError;
pub use identifiers::{
    ActorId, DeliveryNoteId, InvoiceId, InvoiceItemId, ProductId, StockMovementId, TenantId,
};
pub use money::{Money, MoneyError};
pub use tenant::{ScopeError, TenantScope, TenantScoped};
