use std::fmt::Debug;

use log::*;

use crate::{
    bridge_api::{errors::InvoiceFlowError, InvoiceService, NoteUpdate, OrderAnnotator},
    bridge_types::{Invoice, OrderSnapshot},
    traits::{InvoiceProcessor, OrderManagement},
};

pub const DEFAULT_INVOICE_GATEWAY: &str = "manual";

#[derive(Debug, Clone, PartialEq)]
pub enum NewOrderOutcome {
    /// An invoice was created and attached to the order.
    Invoiced(Invoice),
    /// The order is paid through some other gateway. Contains the gateway name.
    SkippedGateway(String),
    /// A previous delivery already invoiced this order.
    AlreadyInvoiced,
}

/// `InvoiceFlowApi` handles "order created" events from the commerce platform: orders placed with the manual payment
/// method get a crypto invoice, and the invoice URL is written back onto the order so the customer can be sent to it.
pub struct InvoiceFlowApi<B, P> {
    annotator: OrderAnnotator<B>,
    invoices: InvoiceService<P>,
    invoice_gateway: String,
}

impl<B, P> Debug for InvoiceFlowApi<B, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "InvoiceFlowApi({})", self.invoice_gateway)
    }
}

impl<B, P> InvoiceFlowApi<B, P> {
    pub fn new(backend: B, invoices: InvoiceService<P>) -> Self {
        Self { annotator: OrderAnnotator::new(backend), invoices, invoice_gateway: DEFAULT_INVOICE_GATEWAY.to_string() }
    }

    /// Only orders placed through `gateway` (case-insensitive) are invoiced.
    pub fn with_invoice_gateway<S: Into<String>>(mut self, gateway: S) -> Self {
        self.invoice_gateway = gateway.into();
        self
    }

    pub fn invoice_gateway(&self) -> &str {
        &self.invoice_gateway
    }
}

impl<B, P> InvoiceFlowApi<B, P>
where
    B: OrderManagement,
    P: InvoiceProcessor,
{
    /// Invoices a newly created order, at most once.
    ///
    /// `order` is the order as it arrived in the webhook. It is only used to check the gateway; the order is re-read
    /// before anything else happens, so a redelivered webhook sees the invoice attached by the first delivery.
    ///
    /// If the invoice is created but cannot be written back to the order, the invoice is returned inside
    /// [`InvoiceFlowError::Annotation`]. A later redelivery will create a second invoice in that case.
    pub async fn process_new_order(&self, order: OrderSnapshot) -> Result<NewOrderOutcome, InvoiceFlowError> {
        let gateway = order.gateway.clone().unwrap_or_default();
        if !gateway.trim().eq_ignore_ascii_case(self.invoice_gateway.trim()) {
            debug!("💸️ Order {} uses gateway '{gateway}'. No invoice is needed.", order.id);
            return Ok(NewOrderOutcome::SkippedGateway(gateway));
        }
        let order_id = order.order_id();
        let current = self.annotator.fetch_order(&order_id).await?;
        if current.has_invoice() {
            info!("💸️ Order {order_id} has already been invoiced. Ignoring the duplicate event.");
            return Ok(NewOrderOutcome::AlreadyInvoiced);
        }
        let invoice = self.invoices.create_invoice(&current).await?;
        match self.annotator.set_note_fields_on(&current, &invoice.note_attributes()).await {
            Ok(NoteUpdate::Written(_)) | Ok(NoteUpdate::Unchanged) => {
                info!("💸️ Order {order_id} can be paid at {}", invoice.invoice_url);
                Ok(NewOrderOutcome::Invoiced(invoice))
            },
            Err(error) => Err(InvoiceFlowError::Annotation { invoice, error }),
        }
    }
}
