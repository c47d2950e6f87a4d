use nowpayments_tools::{InvoiceRequest, NowPaymentsApi, NowPaymentsApiError};
use payment_bridge_engine::{
    bridge_types::{CreatedInvoice, NewInvoice},
    InvoiceError,
    InvoiceProcessor,
};

/// NOWPayments, as the processor that invoices are raised with.
#[derive(Clone)]
pub struct NowPaymentsInvoices {
    api: NowPaymentsApi,
}

impl NowPaymentsInvoices {
    pub fn new(api: NowPaymentsApi) -> Self {
        Self { api }
    }
}

pub fn invoice_request(invoice: &NewInvoice) -> InvoiceRequest {
    InvoiceRequest {
        price_amount: invoice.price_amount,
        price_currency: invoice.price_currency.clone(),
        order_id: invoice.order_id.to_string(),
        order_description: invoice.order_description.clone(),
        ipn_callback_url: invoice.callback_url.clone(),
    }
}

fn to_invoice_error(e: NowPaymentsApiError) -> InvoiceError {
    match e {
        NowPaymentsApiError::QueryError { status, message } => InvoiceError::Rejected { status, message },
        e => InvoiceError::Unavailable(e.to_string()),
    }
}

impl InvoiceProcessor for NowPaymentsInvoices {
    async fn create_invoice(&self, invoice: &NewInvoice) -> Result<CreatedInvoice, InvoiceError> {
        let response = self.api.create_invoice(&invoice_request(invoice)).await.map_err(to_invoice_error)?;
        Ok(CreatedInvoice { id: response.id, invoice_url: response.invoice_url })
    }
}
