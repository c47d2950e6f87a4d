use bridge_common::Price;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Body of `POST /v1/invoice`.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceRequest {
    pub price_amount: Price,
    pub price_currency: String,
    /// Opaque to NOWPayments. It is echoed back in every IPN for the invoice's payments.
    pub order_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_description: Option<String>,
    pub ipn_callback_url: String,
}

/// The fields of a created invoice that the bridge uses. NOWPayments returns more.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct InvoiceResponse {
    #[serde(default, deserialize_with = "deserialize_opt_scalar")]
    pub id: Option<String>,
    #[serde(default)]
    pub invoice_url: Option<String>,
}

// Ids come back as strings or numbers depending on the endpoint version.
fn deserialize_opt_scalar<'de, D>(d: D) -> Result<Option<String>, D::Error>
where D: Deserializer<'de> {
    match Value::deserialize(d)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(serde::de::Error::custom(format!("Expected a string or number, got {other}"))),
    }
}
