//! Payment Bridge Engine
//!
//! The payment bridge lets a Shopify store take crypto payments through NOWPayments. This library contains the
//! reconciliation core of the bridge. It is transport-agnostic: it never sees an HTTP request.
//!
//! The library is divided into three main sections:
//! 1. Webhook authentication ([`mod@helpers`]). Both upstream systems sign their webhooks, each in its own way.
//!    [`helpers::verify`] checks either scheme.
//! 2. The payment state machine ([`mod@payment_state`]). An order's payment state lives in its tags on the commerce
//!    platform. This module decides which tag an inbound payment status should add, if any, without ever moving an
//!    order backwards.
//! 3. The bridge public API ([`mod@bridge_api`]). [`InvoiceFlowApi`] invoices new orders and [`PaymentFlowApi`]
//!    applies payment status changes. Both are generic over the traits in [`mod@traits`], which the Shopify and
//!    NOWPayments clients implement.
//!
//! There is no database. The commerce platform's order record is the only record of payment status, and every write
//! is preceded by a fresh read of the order.
pub mod bridge_api;
pub mod bridge_types;
pub mod helpers;
pub mod payment_state;
pub mod traits;

pub use bridge_api::{
    InvoiceFlowApi,
    InvoiceFlowError,
    InvoiceService,
    NewOrderOutcome,
    OrderAnnotator,
    PaymentFlowApi,
    PaymentFlowError,
    TransitionOutcome,
};
pub use traits::{InvoiceError, InvoiceProcessor, OrderManagement, OrderManagementError};
