use mockall::mock;
use payment_bridge_engine::{
    bridge_types::{CreatedInvoice, NewInvoice, NoteAttribute, OrderId, OrderSnapshot, TagSet},
    InvoiceError,
    InvoiceProcessor,
    OrderManagement,
    OrderManagementError,
};

mock! {
    pub OrderManager {}
    impl OrderManagement for OrderManager {
        async fn fetch_order(&self, order_id: &OrderId) -> Result<OrderSnapshot, OrderManagementError>;
        async fn write_tags(&self, order_id: &OrderId, tags: &TagSet) -> Result<(), OrderManagementError>;
        async fn write_note_attributes(&self, order_id: &OrderId, attributes: &[NoteAttribute]) -> Result<(), OrderManagementError>;
        async fn mark_as_paid(&self, order_id: &OrderId) -> Result<(), OrderManagementError>;
    }
}

mock! {
    pub PaymentProcessor {}
    impl InvoiceProcessor for PaymentProcessor {
        async fn create_invoice(&self, invoice: &NewInvoice) -> Result<CreatedInvoice, InvoiceError>;
    }
}

/// An order manager that must not be called at all.
pub fn untouchable_order_manager() -> MockOrderManager {
    let mut orders = MockOrderManager::new();
    orders.expect_fetch_order().never();
    orders.expect_write_tags().never();
    orders.expect_write_note_attributes().never();
    orders.expect_mark_as_paid().never();
    orders
}

pub fn untouchable_processor() -> MockPaymentProcessor {
    let mut processor = MockPaymentProcessor::new();
    processor.expect_create_invoice().never();
    processor
}
