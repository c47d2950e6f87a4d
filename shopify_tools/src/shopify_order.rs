use serde::{Deserialize, Serialize};

use crate::helpers::deserialize_id;

/// The subset of a Shopify order that the bridge reads. The same shape arrives in `orders/create` webhooks and in
/// `GET /orders/{id}.json` responses. Every field apart from `id` is optional, since Shopify omits fields freely.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ShopifyOrder {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// The display name, e.g. "#1001"
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub gateway: Option<String>,
    #[serde(default)]
    pub payment_gateway_names: Vec<String>,
    #[serde(default)]
    pub total_price: Option<String>,
    #[serde(default)]
    pub current_total_price: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub presentment_currency: Option<String>,
    #[serde(default)]
    pub financial_status: Option<String>,
    /// Comma-separated tag list
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub note_attributes: Vec<NoteAttribute>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct NoteAttribute {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

impl NoteAttribute {
    pub fn new<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

impl ShopifyOrder {
    /// The gateway that was selected at checkout. The deprecated `gateway` field is preferred, since that is what the
    /// manual payment method populates; `payment_gateway_names` is the fallback.
    pub fn gateway_name(&self) -> Option<&str> {
        self.gateway
            .as_deref()
            .filter(|g| !g.is_empty())
            .or_else(|| self.payment_gateway_names.first().map(String::as_str))
    }
}
