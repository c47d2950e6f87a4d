//! # External collaborators
//!
//! The bridge owns no data. Everything it knows comes from, and everything it does goes to, one of two remote
//! systems. These traits are the contracts the reconciliation core needs from them:
//!
//! * [`OrderManagement`]: read an order and write back its tags and note attributes on the commerce platform.
//! * [`InvoiceProcessor`]: create an invoice with the payment processor.
//!
//! Implementations make exactly one attempt per call. Retrying, if desired, belongs in the implementation, not in the
//! core.
mod invoice_processor;
mod order_management;

pub use invoice_processor::{InvoiceError, InvoiceProcessor};
pub use order_management::{OrderManagement, OrderManagementError};
