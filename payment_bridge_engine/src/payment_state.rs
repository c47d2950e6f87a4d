//! # Payment state
//!
//! The bridge keeps no payment state of its own. An order's payment state is whatever its tags say it is, and every
//! IPN drives a transition purely from the latest status string plus the order's current tags.
//!
//! ```text
//!   unpaid ──► invoice_created ──► partially_paid ──► paid | failed | refunded | expired
//! ```
//!
//! Delivery is at-least-once and unordered, so a transition is only applied when it moves the order forward:
//!
//! * `confirmed` / `finished` always add `crypto_paid`.
//! * `partially_paid` adds `crypto_partially_paid` unless a terminal tag is already present.
//! * `failed` / `refunded` / `expired` add their tag unless `crypto_paid` is already present.
//! * Re-applying a tag that is already present is a no-op.
//! * Every other status is acknowledged and ignored.

use std::fmt::Display;

use serde_json::Value;

use crate::bridge_types::{OrderId, TagSet};

//--------------------------------------    PaymentStatus   ---------------------------------------------------------
/// The processor's payment status, as reported in an IPN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentStatus {
    Waiting,
    Confirming,
    Confirmed,
    Sending,
    PartiallyPaid,
    Finished,
    Failed,
    Refunded,
    Expired,
    Unknown(String),
}

impl From<&str> for PaymentStatus {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "waiting" => Self::Waiting,
            "confirming" => Self::Confirming,
            "confirmed" => Self::Confirmed,
            "sending" => Self::Sending,
            "partially_paid" => Self::PartiallyPaid,
            "finished" => Self::Finished,
            "failed" => Self::Failed,
            "refunded" => Self::Refunded,
            "expired" => Self::Expired,
            _ => Self::Unknown(value.to_string()),
        }
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Waiting => "waiting",
            Self::Confirming => "confirming",
            Self::Confirmed => "confirmed",
            Self::Sending => "sending",
            Self::PartiallyPaid => "partially_paid",
            Self::Finished => "finished",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
            Self::Expired => "expired",
            Self::Unknown(s) => return write!(f, "unknown ({s})"),
        };
        f.write_str(s)
    }
}

impl PaymentStatus {
    /// The tag this status asks for, if any.
    pub fn target_tag(&self) -> Option<PaymentTag> {
        match self {
            Self::Confirmed | Self::Finished => Some(PaymentTag::Paid),
            Self::PartiallyPaid => Some(PaymentTag::PartiallyPaid),
            Self::Failed => Some(PaymentTag::Failed),
            Self::Refunded => Some(PaymentTag::Refunded),
            Self::Expired => Some(PaymentTag::Expired),
            Self::Waiting | Self::Confirming | Self::Sending | Self::Unknown(_) => None,
        }
    }
}

//--------------------------------------     PaymentTag     ---------------------------------------------------------
/// The order tags that record payment progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentTag {
    PartiallyPaid,
    Paid,
    Failed,
    Refunded,
    Expired,
}

impl PaymentTag {
    pub const ALL: [PaymentTag; 5] = [Self::PartiallyPaid, Self::Paid, Self::Failed, Self::Refunded, Self::Expired];

    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::PartiallyPaid => "crypto_partially_paid",
            Self::Paid => "crypto_paid",
            Self::Failed => "crypto_failed",
            Self::Refunded => "crypto_refunded",
            Self::Expired => "crypto_expired",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::PartiallyPaid)
    }

    /// The payment tags present in `tags`.
    pub fn present_in(tags: &TagSet) -> Vec<PaymentTag> {
        Self::ALL.into_iter().filter(|t| tags.contains(t.as_tag())).collect()
    }
}

impl Display for PaymentTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_tag())
    }
}

//-------------------------------------- TransitionDecision ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionDecision {
    /// Add the tag.
    Apply(PaymentTag),
    /// The tag is already on the order. Typically a redelivered IPN.
    AlreadyApplied(PaymentTag),
    /// The order has already moved past the requested state.
    Superseded { requested: PaymentTag, current: PaymentTag },
    /// The status does not map to any order change.
    NoAction(PaymentStatus),
}

/// Decides what an inbound `status` should do to an order currently carrying `tags`.
pub fn decide_transition(status: &PaymentStatus, tags: &TagSet) -> TransitionDecision {
    let Some(requested) = status.target_tag() else {
        return TransitionDecision::NoAction(status.clone());
    };
    if tags.contains(requested.as_tag()) {
        return TransitionDecision::AlreadyApplied(requested);
    }
    let present = PaymentTag::present_in(tags);
    let blocker = match requested {
        PaymentTag::Paid => None,
        PaymentTag::PartiallyPaid => present.into_iter().find(PaymentTag::is_terminal),
        PaymentTag::Failed | PaymentTag::Refunded | PaymentTag::Expired => {
            present.into_iter().find(|t| *t == PaymentTag::Paid)
        },
    };
    match blocker {
        Some(current) => TransitionDecision::Superseded { requested, current },
        None => TransitionDecision::Apply(requested),
    }
}

//--------------------------------------  PaymentStatusEvent ---------------------------------------------------------
/// A single IPN, as far as the bridge cares about it. Lives only for the duration of the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentStatusEvent {
    pub order_id: Option<OrderId>,
    pub payment_id: Option<String>,
    pub status: PaymentStatus,
}

impl PaymentStatusEvent {
    /// Extracts the event from an IPN body. Field names vary between API versions, so `order_id`, `orderId` and
    /// `order.id` are all accepted for the order, and `payment_status` or `paymentStatus` for the status.
    pub fn from_json(value: &Value) -> Self {
        let order_id = [&value["order_id"], &value["orderId"], &value["order"]["id"]]
            .into_iter()
            .find_map(scalar_to_string)
            .map(OrderId);
        let payment_id = scalar_to_string(&value["payment_id"]);
        let status = [&value["payment_status"], &value["paymentStatus"]]
            .into_iter()
            .find_map(scalar_to_string)
            .map(|s| PaymentStatus::from(s.as_str()))
            .unwrap_or_else(|| PaymentStatus::Unknown(String::new()));
        Self { order_id, payment_id, status }
    }
}

fn scalar_to_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
