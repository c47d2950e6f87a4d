use thiserror::Error;

use crate::bridge_types::{NoteAttribute, OrderId, OrderSnapshot, TagSet};

#[derive(Debug, Clone, Error)]
pub enum OrderManagementError {
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("The commerce platform rejected the request. {0}")]
    RequestRejected(String),
    #[error("Could not reach the commerce platform. {0}")]
    Unavailable(String),
}

/// Order reads and writes against the commerce platform.
///
/// Writes replace the named field wholesale. There is no compare-and-swap, so a caller doing a read-modify-write can
/// lose a concurrent update made between its read and its write.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Fetch the current state of the order.
    async fn fetch_order(&self, order_id: &OrderId) -> Result<OrderSnapshot, OrderManagementError>;
    /// Replace the order's tags with `tags`.
    async fn write_tags(&self, order_id: &OrderId, tags: &TagSet) -> Result<(), OrderManagementError>;
    /// Replace the order's note attributes with `attributes`.
    async fn write_note_attributes(
        &self,
        order_id: &OrderId,
        attributes: &[NoteAttribute],
    ) -> Result<(), OrderManagementError>;
    /// Move the order's financial status to "paid".
    async fn mark_as_paid(&self, order_id: &OrderId) -> Result<(), OrderManagementError>;
}
