//! # Webhook signatures
//!
//! Both upstream systems authenticate their webhooks with an HMAC over the request body, keyed with a shared secret,
//! but they disagree on almost every detail:
//!
//! | scheme                   | header                  | MAC         | signing input              | encoding |
//! |--------------------------|-------------------------|-------------|----------------------------|----------|
//! | `ShopifyHmacSha256`      | `X-Shopify-Hmac-SHA256` | HMAC-SHA256 | the raw body bytes         | base64   |
//! | `NowPaymentsHmacSha512`  | `x-nowpayments-sig`     | HMAC-SHA512 | [canonical JSON](super::canonicalize) of the body | hex |
//!
//! For Shopify, the raw bytes must be the bytes exactly as received. Parsing and re-serializing the body changes
//! whitespace and key order and the digest will not match.
//!
//! The expected and received signatures are compared in constant time. Any failure (missing header, malformed body,
//! empty secret) is a verification failure: nothing in this module panics or returns an error.

use hmac::{Hmac, Mac};
use log::*;
use sha2::{Sha256, Sha512};
use subtle::ConstantTimeEq;

use crate::helpers::canonicalize_bytes;

type HmacSha256 = Hmac<Sha256>;
type HmacSha512 = Hmac<Sha512>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureScheme {
    /// Shopify webhooks: base64(HMAC-SHA256(secret, raw body))
    ShopifyHmacSha256,
    /// NOWPayments IPN: hex(HMAC-SHA512(secret, canonical json(body)))
    NowPaymentsHmacSha512,
}

impl SignatureScheme {
    pub fn header_name(&self) -> &'static str {
        match self {
            Self::ShopifyHmacSha256 => "X-Shopify-Hmac-SHA256",
            Self::NowPaymentsHmacSha512 => "x-nowpayments-sig",
        }
    }
}

/// Everything needed to authenticate one webhook delivery.
#[derive(Clone, Copy)]
pub struct WebhookVerificationContext<'a> {
    pub secret: &'a str,
    /// The request body, undecoded.
    pub body: &'a [u8],
    /// The value of the signature header, if the sender supplied one.
    pub signature: Option<&'a str>,
}

impl<'a> WebhookVerificationContext<'a> {
    pub fn new(secret: &'a str, body: &'a [u8], signature: Option<&'a str>) -> Self {
        Self { secret, body, signature }
    }

    pub fn verify(&self, scheme: SignatureScheme) -> bool {
        verify(self.body, self.signature, self.secret, scheme)
    }
}

/// Calculates the signature header value a sender using `scheme` would attach to `body`.
///
/// Returns `None` only for [`SignatureScheme::NowPaymentsHmacSha512`] when the body is not a JSON object.
pub fn sign(body: &[u8], secret: &str, scheme: SignatureScheme) -> Option<String> {
    match scheme {
        SignatureScheme::ShopifyHmacSha256 => {
            let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
            mac.update(body);
            Some(base64::encode(mac.finalize().into_bytes()))
        },
        SignatureScheme::NowPaymentsHmacSha512 => {
            let canonical = canonicalize_bytes(body)?;
            let mut mac = HmacSha512::new_from_slice(secret.as_bytes()).ok()?;
            mac.update(canonical.as_bytes());
            Some(hex::encode(mac.finalize().into_bytes()))
        },
    }
}

/// Checks that `signature` is the signature of `body` under `scheme` and `secret`.
pub fn verify(body: &[u8], signature: Option<&str>, secret: &str, scheme: SignatureScheme) -> bool {
    let Some(signature) = signature.map(str::trim).filter(|s| !s.is_empty()) else {
        debug!("🔐️ No {} signature was provided", scheme.header_name());
        return false;
    };
    if secret.is_empty() {
        warn!("🔐️ Refusing to verify a {} signature with an empty secret", scheme.header_name());
        return false;
    }
    let Some(expected) = sign(body, secret, scheme) else {
        debug!("🔐️ The request body has no signable form under {scheme:?}");
        return false;
    };
    let received = match scheme {
        // base64 is case-sensitive; hex is not.
        SignatureScheme::ShopifyHmacSha256 => signature.to_string(),
        SignatureScheme::NowPaymentsHmacSha512 => signature.to_ascii_lowercase(),
    };
    expected.as_bytes().ct_eq(received.as_bytes()).into()
}
