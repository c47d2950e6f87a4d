//! # Payment bridge server
//! This crate hosts the HTTP side of the payment bridge. It is responsible for:
//! Listening for incoming webhook requests from Shopify and NOWPayments.
//! Verifying the webhook signatures.
//! Parsing the request body and handing it to the engine's invoice and payment flows.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/webhooks/order-created`: Shopify's `orders/create` webhook.
//! * `/webhooks/payment-status`: NOWPayments' IPN callback.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
