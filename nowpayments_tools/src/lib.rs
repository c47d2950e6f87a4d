//! A minimal NOWPayments REST client. Only invoice creation is needed by the payment bridge; status changes arrive as
//! IPN webhooks.
mod api;
mod config;
mod data_objects;
mod error;

pub use api::NowPaymentsApi;
pub use config::{NowPaymentsConfig, DEFAULT_NOWPAYMENTS_API_URL};
pub use data_objects::{InvoiceRequest, InvoiceResponse};
pub use error::NowPaymentsApiError;
