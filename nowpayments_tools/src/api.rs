use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};

use crate::{InvoiceRequest, InvoiceResponse, NowPaymentsApiError, NowPaymentsConfig};

#[derive(Clone)]
pub struct NowPaymentsApi {
    config: NowPaymentsConfig,
    client: Arc<Client>,
}

impl NowPaymentsApi {
    pub fn new(config: NowPaymentsConfig) -> Result<Self, NowPaymentsApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        let val = HeaderValue::from_str(config.api_key.reveal().as_str())
            .map_err(|e| NowPaymentsApiError::Initialization(e.to_string()))?;
        headers.insert("x-api-key", val);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| NowPaymentsApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/v1{path}", self.config.api_url)
    }

    /// Creates a hosted invoice. A single attempt is made; retrying is the caller's business.
    pub async fn create_invoice(&self, request: &InvoiceRequest) -> Result<InvoiceResponse, NowPaymentsApiError> {
        let url = self.url("/invoice");
        debug!(
            "💸️ Creating invoice for order {} ({} {})",
            request.order_id, request.price_amount, request.price_currency
        );
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| NowPaymentsApiError::RequestError(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            let invoice =
                response.json::<InvoiceResponse>().await.map_err(|e| NowPaymentsApiError::JsonError(e.to_string()))?;
            trace!("💸️ Invoice create result: {invoice:?}");
            Ok(invoice)
        } else {
            let message = response.text().await.map_err(|e| NowPaymentsApiError::RequestError(e.to_string()))?;
            Err(NowPaymentsApiError::QueryError { status: status.as_u16(), message })
        }
    }
}
