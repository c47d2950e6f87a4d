use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Shopify ids are 64-bit integers in REST payloads, but other integrations hand them around as strings. Accept both
/// and keep them as opaque strings.
pub(crate) fn deserialize_id<'de, D>(d: D) -> Result<String, D::Error>
where D: Deserializer<'de> {
    match Value::deserialize(d)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("Expected a string or numeric id, got {other}"))),
    }
}

/// Renders an order id the way the REST API expects it in request bodies: as a number when it is numeric.
pub fn order_id_value(order_id: &str) -> Value {
    match order_id.parse::<u64>() {
        Ok(n) => Value::from(n),
        Err(_) => Value::from(order_id),
    }
}

/// The GraphQL global id for an order.
pub fn order_gid(order_id: &str) -> String {
    if order_id.starts_with("gid://") {
        order_id.to_string()
    } else {
        format!("gid://shopify/Order/{order_id}")
    }
}
