//! Repository implementations
//!
//! Creation- and read-side access used by the request layer. Lifecycle
//! mutation goes through the transactional workflow store instead, never
//! through these repositories.

pub mod invoices;
pub mod movements;
pub mod products;

pub use invoices::{InvoiceRepository, NewInvoice};
pub use movements::MovementRepository;
pub use products::ProductRepository;
