use std::fmt::Display;

use bridge_common::Price;
use serde::{Deserialize, Serialize};

//--------------------------------------      OrderId       ---------------------------------------------------------
/// The commerce platform's identifier for an order. It is opaque to the bridge and is also the join key that the
/// payment processor echoes back in status notifications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

impl OrderId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OrderId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

//--------------------------------------       TagSet       ---------------------------------------------------------
/// The tags on an order.
///
/// Upstream, tags are a single comma-separated string. `TagSet` keeps the original order (so that a rewrite changes
/// as little as possible) while dropping blanks and duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet(Vec<String>);

impl TagSet {
    pub fn parse(tags: &str) -> Self {
        let mut result = Self::default();
        tags.split(',').map(str::trim).filter(|t| !t.is_empty()).for_each(|t| {
            result.insert(t);
        });
        result
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    /// Adds the tag if it is not present yet. Returns true if the set changed.
    pub fn insert(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.contains(tag) {
            return false;
        }
        self.0.push(tag.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Display for TagSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join(", "))
    }
}

//--------------------------------------    NoteAttribute   ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteAttribute {
    pub name: String,
    pub value: String,
}

impl NoteAttribute {
    pub fn new<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

/// The note attribute that carries the payer-facing invoice URL.
pub const INVOICE_URL_NOTE: &str = "np_payment_url";
/// The note attribute that carries the processor's invoice id.
pub const INVOICE_ID_NOTE: &str = "np_invoice_id";

//--------------------------------------    OrderSnapshot   ---------------------------------------------------------
/// The current state of an order, as last read from the commerce platform. The bridge never stores these; a fresh
/// snapshot is read before every read-modify-write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderSnapshot {
    pub id: String,
    /// Human-readable order name, e.g. "#1001"
    pub name: Option<String>,
    pub gateway: Option<String>,
    pub total_price: Option<String>,
    pub currency: Option<String>,
    /// The platform's own payment state, e.g. "pending" or "paid"
    pub financial_status: Option<String>,
    pub tags: TagSet,
    pub note_attributes: Vec<NoteAttribute>,
}

impl OrderSnapshot {
    pub fn order_id(&self) -> OrderId {
        OrderId(self.id.clone())
    }

    /// The first value recorded under `name`, if any.
    pub fn note_value(&self, name: &str) -> Option<&str> {
        self.note_attributes.iter().find(|a| a.name == name).map(|a| a.value.as_str())
    }

    /// True if the commerce platform itself considers the order paid.
    pub fn is_marked_paid(&self) -> bool {
        self.financial_status.as_deref().is_some_and(|s| s.trim().eq_ignore_ascii_case("paid"))
    }

    /// True if a previous delivery already attached an invoice to this order.
    pub fn has_invoice(&self) -> bool {
        [INVOICE_URL_NOTE, INVOICE_ID_NOTE].iter().any(|n| self.note_value(n).is_some_and(|v| !v.trim().is_empty()))
    }
}

//--------------------------------------      Invoices      ---------------------------------------------------------
/// An invoice request, ready to be sent to the payment processor.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoice {
    pub price_amount: Price,
    pub price_currency: String,
    pub order_id: OrderId,
    pub order_description: Option<String>,
    pub callback_url: String,
}

/// What the payment processor said about an invoice it created. Fields are optional because a "successful" response
/// is not guaranteed to carry them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatedInvoice {
    pub id: Option<String>,
    pub invoice_url: Option<String>,
}

/// A usable invoice: one with a URL the payer can be sent to.
#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    pub id: Option<String>,
    pub invoice_url: String,
    pub price_amount: Price,
    pub price_currency: String,
    pub order_id: OrderId,
}

impl Invoice {
    pub fn note_attributes(&self) -> Vec<NoteAttribute> {
        vec![
            NoteAttribute::new(INVOICE_URL_NOTE, self.invoice_url.as_str()),
            NoteAttribute::new(INVOICE_ID_NOTE, self.id.clone().unwrap_or_default()),
        ]
    }
}

impl Display for Invoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Invoice {} for order {} ({} {}): {}",
            self.id.as_deref().unwrap_or("<no id>"),
            self.order_id,
            self.price_amount,
            self.price_currency,
            self.invoice_url
        )
    }
}
