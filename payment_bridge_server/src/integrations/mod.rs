//! Adapters that let the engine drive the real Shopify and NOWPayments clients.
pub mod nowpayments;
pub mod shopify;

pub use nowpayments::NowPaymentsInvoices;
pub use shopify::{order_snapshot, ShopifyOrders};
