use thiserror::Error;

use crate::{
    bridge_types::{Invoice, OrderId},
    traits::{InvoiceError, OrderManagementError},
};

#[derive(Debug, Clone, Error)]
pub enum InvoiceFlowError {
    #[error("Could not read or update the order. {0}")]
    Order(#[from] OrderManagementError),
    #[error("Could not create an invoice. {0}")]
    Invoice(#[from] InvoiceError),
    /// The invoice exists on the processor, but the order does not point to it. The invoice is kept here so that the
    /// URL can at least be logged.
    #[error("{invoice} was created, but could not be attached to the order. {error}")]
    Annotation { invoice: Invoice, error: OrderManagementError },
}

#[derive(Debug, Clone, Error)]
pub enum PaymentFlowError {
    #[error("Could not update order {order_id}. {error}")]
    Order { order_id: OrderId, error: OrderManagementError },
    #[error("Order {order_id} is tagged as paid, but could not be marked as paid. {error}")]
    MarkAsPaid { order_id: OrderId, error: OrderManagementError },
}
