use bridge_common::Secret;
use log::*;

pub const DEFAULT_NOWPAYMENTS_API_URL: &str = "https://api.nowpayments.io";

#[derive(Debug, Clone, Default)]
pub struct NowPaymentsConfig {
    /// API root, without a trailing slash or version segment.
    pub api_url: String,
    pub api_key: Secret<String>,
}

impl NowPaymentsConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = std::env::var("BRIDGE_NOWPAYMENTS_API_URL")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| {
                debug!("BRIDGE_NOWPAYMENTS_API_URL not set, using {DEFAULT_NOWPAYMENTS_API_URL}");
                DEFAULT_NOWPAYMENTS_API_URL.to_string()
            });
        let api_key = Secret::new(std::env::var("BRIDGE_NOWPAYMENTS_API_KEY").unwrap_or_else(|_| {
            error!("BRIDGE_NOWPAYMENTS_API_KEY not set. Invoice creation will fail.");
            String::default()
        }));
        Self { api_url, api_key }
    }
}
