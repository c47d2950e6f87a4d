use std::env;

use bridge_common::{parse_boolean_flag, Secret};
use log::*;
use nowpayments_tools::NowPaymentsConfig;
use payment_bridge_engine::{
    bridge_api::{DEFAULT_INVOICE_CURRENCY, DEFAULT_INVOICE_GATEWAY},
    helpers::SignatureScheme,
};
use shopify_tools::ShopifyConfig;

const DEFAULT_BRIDGE_HOST: &str = "127.0.0.1";
const DEFAULT_BRIDGE_PORT: u16 = 8370;
pub const PAYMENT_STATUS_PATH: &str = "/webhooks/payment-status";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// The externally reachable root URL of this server. The payment processor posts status updates to
    /// `{base_url}/webhooks/payment-status`.
    pub base_url: String,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_x_forwarded_for: bool,
    pub shopify: ShopifyConfig,
    pub nowpayments: NowPaymentsConfig,
    pub secrets: WebhookSecrets,
    pub invoice: InvoiceConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_BRIDGE_HOST.to_string(),
            port: DEFAULT_BRIDGE_PORT,
            base_url: format!("http://{DEFAULT_BRIDGE_HOST}:{DEFAULT_BRIDGE_PORT}"),
            use_x_forwarded_for: false,
            shopify: ShopifyConfig::default(),
            nowpayments: NowPaymentsConfig::default(),
            secrets: WebhookSecrets::default(),
            invoice: InvoiceConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, base_url: format!("http://{host}:{port}"), ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("BRIDGE_HOST").ok().unwrap_or_else(|| DEFAULT_BRIDGE_HOST.into());
        let port = env::var("BRIDGE_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for BRIDGE_PORT. {e} Using the default, {DEFAULT_BRIDGE_PORT}, \
                         instead."
                    );
                    DEFAULT_BRIDGE_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_BRIDGE_PORT);
        let base_url = env::var("BRIDGE_BASE_URL")
            .ok()
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| {
                let url = format!("http://{host}:{port}");
                warn!(
                    "🪛️ BRIDGE_BASE_URL is not set. Using {url}. NOWPayments will not be able to deliver payment \
                     updates unless this address is reachable from the internet."
                );
                url
            });
        let use_x_forwarded_for = parse_boolean_flag(env::var("BRIDGE_USE_X_FORWARDED_FOR").ok(), false);
        let shopify = ShopifyConfig::new_from_env_or_default();
        let nowpayments = NowPaymentsConfig::new_from_env_or_default();
        let secrets = WebhookSecrets::from_env();
        let invoice = InvoiceConfig::from_env_or_default();
        Self { host, port, base_url, use_x_forwarded_for, shopify, nowpayments, secrets, invoice }
    }

    /// The URL handed to the payment processor for status notifications.
    pub fn payment_status_callback_url(&self) -> String {
        format!("{}{PAYMENT_STATUS_PATH}", self.base_url.trim_end_matches('/'))
    }
}

//-------------------------------------------------  WebhookSecrets  ---------------------------------------------------
/// The shared secrets used to authenticate inbound webhooks. An empty secret means the corresponding endpoint is
/// misconfigured, and every call to it fails with a 500.
#[derive(Clone, Debug, Default)]
pub struct WebhookSecrets {
    pub shopify_hmac_secret: Secret<String>,
    pub nowpayments_ipn_secret: Secret<String>,
}

impl WebhookSecrets {
    pub fn new<S1: Into<String>, S2: Into<String>>(shopify_hmac_secret: S1, nowpayments_ipn_secret: S2) -> Self {
        Self {
            shopify_hmac_secret: Secret::new(shopify_hmac_secret.into()),
            nowpayments_ipn_secret: Secret::new(nowpayments_ipn_secret.into()),
        }
    }

    pub fn from_env() -> Self {
        let shopify_hmac_secret = env::var("BRIDGE_SHOPIFY_HMAC_SECRET").ok().unwrap_or_else(|| {
            error!(
                "🪛️ BRIDGE_SHOPIFY_HMAC_SECRET is not set. Please set it to the webhook signing secret for your \
                 Shopify app. Order webhooks will be rejected until you do."
            );
            String::default()
        });
        let nowpayments_ipn_secret = env::var("BRIDGE_NOWPAYMENTS_IPN_SECRET").ok().unwrap_or_else(|| {
            error!(
                "🪛️ BRIDGE_NOWPAYMENTS_IPN_SECRET is not set. Please set it to the IPN secret from your NOWPayments \
                 dashboard. Payment notifications will be rejected until you do."
            );
            String::default()
        });
        Self::new(shopify_hmac_secret, nowpayments_ipn_secret)
    }

    pub fn secret_for(&self, scheme: SignatureScheme) -> &Secret<String> {
        match scheme {
            SignatureScheme::ShopifyHmacSha256 => &self.shopify_hmac_secret,
            SignatureScheme::NowPaymentsHmacSha512 => &self.nowpayments_ipn_secret,
        }
    }
}

//-------------------------------------------------  InvoiceConfig  ----------------------------------------------------
#[derive(Clone, Debug)]
pub struct InvoiceConfig {
    /// Orders placed with this payment gateway are invoiced. Matched case-insensitively.
    pub gateway: String,
    /// The invoice currency for orders that do not specify one.
    pub default_currency: String,
    /// If true, orders are also marked as paid on Shopify when the payment completes, not just tagged.
    pub mark_as_paid: bool,
}

impl Default for InvoiceConfig {
    fn default() -> Self {
        Self {
            gateway: DEFAULT_INVOICE_GATEWAY.to_string(),
            default_currency: DEFAULT_INVOICE_CURRENCY.to_string(),
            mark_as_paid: false,
        }
    }
}

impl InvoiceConfig {
    pub fn from_env_or_default() -> Self {
        let gateway = env::var("BRIDGE_INVOICE_GATEWAY").ok().filter(|s| !s.trim().is_empty()).unwrap_or_else(|| {
            info!(
                "🪛️ BRIDGE_INVOICE_GATEWAY is not set. Orders using the '{DEFAULT_INVOICE_GATEWAY}' gateway will be \
                 invoiced."
            );
            DEFAULT_INVOICE_GATEWAY.to_string()
        });
        let default_currency = env::var("BRIDGE_DEFAULT_CURRENCY")
            .ok()
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_INVOICE_CURRENCY.to_string());
        let mark_as_paid = parse_boolean_flag(env::var("BRIDGE_SHOPIFY_MARK_AS_PAID").ok(), false);
        if mark_as_paid {
            info!("🪛️ Paid orders will be marked as paid on Shopify.");
        }
        Self { gateway, default_currency, mark_as_paid }
    }
}

//-------------------------------------------------  ServerOptions  ----------------------------------------------------
/// A subset of the server configuration that is used to configure the server's behaviour. It contains no secrets, so
/// it can be handed to every handler.
#[derive(Clone, Copy, Debug, Default)]
pub struct ServerOptions {
    pub use_x_forwarded_for: bool,
}

impl ServerOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self { use_x_forwarded_for: config.use_x_forwarded_for }
    }
}
