mod canonical_json;
mod webhook_signature;

pub use canonical_json::{canonicalize, canonicalize_bytes};
pub use webhook_signature::{sign, verify, SignatureScheme, WebhookVerificationContext};
