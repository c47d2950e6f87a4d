//! # Canonical JSON
//!
//! NOWPayments signs its IPN callbacks over a "key-sorted" rendering of the JSON body rather than over the raw bytes.
//! The rules are narrow:
//!
//! * Only the keys of the top-level object are sorted, ascending by code point.
//! * Nested objects keep the key order they were received in.
//! * The output is compact: no whitespace between tokens.
//!
//! Nested key order and number text survive a parse/serialize round trip because `serde_json` is built with the
//! `preserve_order` and `arbitrary_precision` features.

use serde_json::{Map, Value};

/// Renders `value` in canonical form. Returns `None` if `value` is not a JSON object.
pub fn canonicalize(value: &Value) -> Option<String> {
    let object = value.as_object()?;
    let mut entries = object.iter().collect::<Vec<_>>();
    entries.sort_by(|(a, _), (b, _)| a.cmp(b));
    let sorted = entries.into_iter().map(|(k, v)| (k.clone(), v.clone())).collect::<Map<String, Value>>();
    serde_json::to_string(&Value::Object(sorted)).ok()
}

/// Parses `body` and renders it in canonical form. Returns `None` if the body is not a JSON object.
pub fn canonicalize_bytes(body: &[u8]) -> Option<String> {
    let value = serde_json::from_slice::<Value>(body).ok()?;
    canonicalize(&value)
}
