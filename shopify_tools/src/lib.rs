//! A thin client for the parts of the Shopify Admin API that the payment bridge needs: reading an order, writing its
//! tags and note attributes, and marking it as paid.
mod api;
mod config;
mod error;
mod helpers;
mod shopify_order;

pub use api::ShopifyApi;
pub use config::ShopifyConfig;
pub use error::ShopifyApiError;
pub use helpers::{order_gid, order_id_value};
pub use shopify_order::{NoteAttribute, ShopifyOrder};
