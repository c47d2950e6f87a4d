use thiserror::Error;

use crate::bridge_types::{CreatedInvoice, NewInvoice, OrderId};

#[derive(Debug, Clone, Error)]
pub enum InvoiceError {
    #[error("The order total '{0}' is not a valid amount")]
    InvalidAmount(String),
    #[error("Could not reach the payment processor. {0}")]
    Unavailable(String),
    #[error("The payment processor rejected the invoice. Error {status}. {message}")]
    Rejected { status: u16, message: String },
    #[error("The payment processor did not return an invoice URL for order {0}")]
    MissingInvoiceUrl(OrderId),
}

/// Invoice creation on the payment processor.
#[allow(async_fn_in_trait)]
pub trait InvoiceProcessor {
    /// Create a hosted invoice. The processor's response is returned as-is; validating it is up to the caller.
    async fn create_invoice(&self, invoice: &NewInvoice) -> Result<CreatedInvoice, InvoiceError>;
}
