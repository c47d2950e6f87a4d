use std::fmt::Debug;

use bridge_common::Price;
use log::*;

use crate::{
    bridge_types::{Invoice, NewInvoice, OrderSnapshot},
    traits::{InvoiceError, InvoiceProcessor},
};

pub const DEFAULT_INVOICE_CURRENCY: &str = "USD";

/// `InvoiceService` turns an order into a payment-processor invoice.
pub struct InvoiceService<P> {
    processor: P,
    callback_url: String,
    default_currency: String,
}

impl<P> Debug for InvoiceService<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "InvoiceService({})", self.callback_url)
    }
}

impl<P> InvoiceService<P> {
    /// `callback_url` is handed to the processor on every invoice; status notifications for the invoice are delivered
    /// there.
    pub fn new<S: Into<String>>(processor: P, callback_url: S) -> Self {
        Self { processor, callback_url: callback_url.into(), default_currency: DEFAULT_INVOICE_CURRENCY.to_string() }
    }

    pub fn with_default_currency<S: Into<String>>(mut self, currency: S) -> Self {
        self.default_currency = currency.into();
        self
    }

    pub fn callback_url(&self) -> &str {
        &self.callback_url
    }

    /// Builds the invoice request for `order`.
    ///
    /// The order total must be a well-formed, non-negative decimal. A missing or malformed total is rejected rather
    /// than invoiced as zero.
    pub fn new_invoice_for(&self, order: &OrderSnapshot) -> Result<NewInvoice, InvoiceError> {
        let total = order.total_price.as_deref().unwrap_or_default();
        let price_amount = total.parse::<Price>().map_err(|_| InvoiceError::InvalidAmount(total.to_string()))?;
        let price_currency = order
            .currency
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(self.default_currency.as_str())
            .to_uppercase();
        Ok(NewInvoice {
            price_amount,
            price_currency,
            order_id: order.order_id(),
            order_description: order.name.clone(),
            callback_url: self.callback_url.clone(),
        })
    }
}

impl<P> InvoiceService<P>
where P: InvoiceProcessor
{
    /// Creates an invoice for `order` with a single call to the processor.
    ///
    /// A response without an invoice URL is useless to the payer and is reported as a failure.
    pub async fn create_invoice(&self, order: &OrderSnapshot) -> Result<Invoice, InvoiceError> {
        let request = self.new_invoice_for(order)?;
        debug!(
            "💸️ Requesting invoice for order {}: {} {}",
            request.order_id, request.price_amount, request.price_currency
        );
        let created = self.processor.create_invoice(&request).await?;
        let invoice_url = created
            .invoice_url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| InvoiceError::MissingInvoiceUrl(request.order_id.clone()))?;
        let invoice = Invoice {
            id: created.id,
            invoice_url,
            price_amount: request.price_amount,
            price_currency: request.price_currency,
            order_id: request.order_id,
        };
        info!("💸️ {invoice}");
        Ok(invoice)
    }
}
