use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// The body of every webhook response. Webhook senders only look at the status code, so `success` and `message` are
/// there for humans reading the delivery logs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}
