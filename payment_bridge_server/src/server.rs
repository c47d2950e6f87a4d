use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use nowpayments_tools::NowPaymentsApi;
use payment_bridge_engine::{InvoiceFlowApi, InvoiceService, PaymentFlowApi};
use shopify_tools::ShopifyApi;

use crate::{
    config::{ServerConfig, ServerOptions},
    errors::ServerError,
    integrations::{NowPaymentsInvoices, ShopifyOrders},
    routes::{health, OrderCreatedRoute, PaymentStatusRoute},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let shopify = ShopifyApi::new(config.shopify.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let nowpayments =
        NowPaymentsApi::new(config.nowpayments.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, ShopifyOrders::new(shopify), NowPaymentsInvoices::new(nowpayments))?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    shopify: ShopifyOrders,
    nowpayments: NowPaymentsInvoices,
) -> Result<Server, ServerError> {
    let callback_url = config.payment_status_callback_url();
    info!("🪛️ Payment status updates will be delivered to {callback_url}");
    let options = ServerOptions::from_config(&config);
    let ServerConfig { host, port, secrets, invoice, .. } = config;
    let srv = HttpServer::new(move || {
        let invoices = InvoiceService::new(nowpayments.clone(), callback_url.clone())
            .with_default_currency(invoice.default_currency.clone());
        let invoice_api =
            InvoiceFlowApi::new(shopify.clone(), invoices).with_invoice_gateway(invoice.gateway.clone());
        let payment_api = PaymentFlowApi::new(shopify.clone()).with_mark_as_paid(invoice.mark_as_paid);
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("bridge::access_log"))
            .app_data(web::Data::new(invoice_api))
            .app_data(web::Data::new(payment_api))
            .app_data(web::Data::new(secrets.clone()))
            .app_data(web::Data::new(options))
            .service(health)
            .service(OrderCreatedRoute::<ShopifyOrders, NowPaymentsInvoices>::new())
            .service(PaymentStatusRoute::<ShopifyOrders>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
