//! # Payment bridge API
//!
//! * [`invoice_flow_api`] handles "order created" events: it invoices new manually-paid orders on the payment
//!   processor and records the invoice on the order.
//! * [`payment_flow_api`] handles payment status notifications: it moves the order through the payment states by
//!   tagging it.
//!
//! Both are built on [`order_annotator`], which does the read-merge-write dance against the commerce platform, and
//! [`invoice_service`], which builds and submits invoices.
//!
//! As with the backends, each API is generic over the traits it needs, so the same flows run against the real
//! Shopify and NOWPayments clients or against in-memory fakes:
//!
//! ```rust,ignore
//! let invoices = InvoiceService::new(nowpayments, "https://bridge.example.com/webhooks/payment-status");
//! let api = InvoiceFlowApi::new(shopify.clone(), invoices);
//! let outcome = api.process_new_order(order).await?;
//! ```
pub mod errors;
pub mod invoice_flow_api;
pub mod invoice_service;
pub mod order_annotator;
pub mod payment_flow_api;

pub use errors::{InvoiceFlowError, PaymentFlowError};
pub use invoice_flow_api::{InvoiceFlowApi, NewOrderOutcome, DEFAULT_INVOICE_GATEWAY};
pub use invoice_service::{InvoiceService, DEFAULT_INVOICE_CURRENCY};
pub use order_annotator::{NoteUpdate, OrderAnnotator, TagUpdate};
pub use payment_flow_api::{PaymentFlowApi, TransitionOutcome};
