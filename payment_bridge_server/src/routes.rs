//! Request handler definitions
//!
//! Each webhook route is declared with the `route!` macro, followed by its handler.
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Every outbound call in the webhook handlers is an async HTTP request
//! for this reason.
//!
//! Webhook handlers answer 200 once the signature has been verified, whatever happens downstream. The senders retry
//! on anything else, and a retried delivery cannot fix a downstream failure.
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use log::*;
use payment_bridge_engine::{
    payment_state::PaymentStatusEvent,
    InvoiceFlowApi,
    InvoiceFlowError,
    InvoiceProcessor,
    NewOrderOutcome,
    OrderManagement,
    PaymentFlowApi,
    PaymentFlowError,
    TransitionOutcome,
};
use serde_json::Value;
use shopify_tools::ShopifyOrder;

use crate::{
    config::ServerOptions,
    data_objects::JsonResponse,
    errors::ServerError,
    helpers::remote_ip_for_log,
    integrations::order_snapshot,
};

/// The largest webhook body accepted. Shopify orders with many line items easily exceed actix's 256 KiB default.
pub const WEBHOOK_BODY_LIMIT: usize = 8 * 1024 * 1024;

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
//
// Webhook routes accept POST only; other methods get a 405. Signature checks are applied per route, with the scheme
// named after `signed by`.
#[macro_export]
macro_rules! route {
    ($name:ident => Post $path:literal impl $($bounds:ty),+ where signed by $scheme:ident) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .app_data(actix_web::web::PayloadConfig::new($crate::routes::WEBHOOK_BODY_LIMIT))
                    .route(actix_web::web::post().to($name::< $( [< T $bounds:camel >], )+>))
                    .default_service(actix_web::web::route().to($crate::routes::method_not_allowed))
                    .wrap($crate::middleware::SignatureMiddlewareFactory::new(
                        payment_bridge_engine::helpers::SignatureScheme::$scheme,
                    ));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

pub async fn method_not_allowed(req: HttpRequest) -> Result<HttpResponse, ServerError> {
    debug!("💻️ {} {} is not allowed", req.method(), req.path());
    Err(ServerError::MethodNotAllowed)
}

//----------------------------------------------   Order created  ----------------------------------------------------
route!(order_created => Post "/webhooks/order-created" impl OrderManagement, InvoiceProcessor where signed by ShopifyHmacSha256);
/// Route handler for Shopify's `orders/create` webhook.
///
/// Orders placed with the manual payment gateway are invoiced on NOWPayments, and the invoice URL and id are written
/// to the order's note attributes. Other orders, and orders that already carry an invoice, are left alone.
pub async fn order_created<B, P>(
    req: HttpRequest,
    body: web::Bytes,
    api: web::Data<InvoiceFlowApi<B, P>>,
    options: web::Data<ServerOptions>,
) -> HttpResponse
where
    B: OrderManagement,
    P: InvoiceProcessor,
{
    let peer = remote_ip_for_log(&req, options.use_x_forwarded_for);
    trace!("🛍️️ Received order webhook from {peer}");
    let order = match serde_json::from_slice::<ShopifyOrder>(&body) {
        Ok(order) => order,
        Err(e) => {
            warn!("🛍️️ Could not read order webhook payload. {e}");
            return HttpResponse::Ok().json(JsonResponse::failure("Malformed order payload."));
        },
    };
    let order_id = order.id.clone();
    let result = match api.process_new_order(order_snapshot(order)).await {
        Ok(NewOrderOutcome::Invoiced(invoice)) => {
            info!("🛍️️ Order {order_id} invoiced. {invoice}");
            JsonResponse::success(format!("Invoice created: {}", invoice.invoice_url))
        },
        Ok(NewOrderOutcome::SkippedGateway(gateway)) => {
            debug!("🛍️️ Order {order_id} uses gateway '{gateway}'. Skipping.");
            JsonResponse::success("Order does not use the invoice gateway.")
        },
        Ok(NewOrderOutcome::AlreadyInvoiced) => JsonResponse::success("Order has already been invoiced."),
        Err(InvoiceFlowError::Annotation { invoice, error }) => {
            error!(
                "🛍️️ Order {order_id} was invoiced, but the invoice could not be recorded on the order. {error}. The \
                 customer can pay at {}",
                invoice.invoice_url
            );
            JsonResponse::failure("Invoice created, but the order could not be updated.")
        },
        Err(e) => {
            error!("🛍️️ Could not invoice order {order_id}. {e}");
            JsonResponse::failure(e)
        },
    };
    HttpResponse::Ok().json(result)
}

//----------------------------------------------   Payment status  ----------------------------------------------------
route!(payment_status => Post "/webhooks/payment-status" impl OrderManagement where signed by NowPaymentsHmacSha512);
/// Route handler for NOWPayments IPN callbacks.
///
/// The payment status is mapped onto an order tag, which is only added if it moves the order forward.
pub async fn payment_status<B>(
    req: HttpRequest,
    body: web::Bytes,
    api: web::Data<PaymentFlowApi<B>>,
    options: web::Data<ServerOptions>,
) -> HttpResponse
where
    B: OrderManagement,
{
    let peer = remote_ip_for_log(&req, options.use_x_forwarded_for);
    trace!("💸️ Received payment status webhook from {peer}");
    let event = match serde_json::from_slice::<Value>(&body) {
        Ok(value) if value.is_object() => PaymentStatusEvent::from_json(&value),
        Ok(_) | Err(_) => {
            warn!("💸️ Payment status payload is not a JSON object.");
            return HttpResponse::Ok().json(JsonResponse::failure("Malformed payment status payload."));
        },
    };
    debug!(
        "💸️ Payment {} for order {} is '{}'",
        event.payment_id.as_deref().unwrap_or("<unknown>"),
        event.order_id.as_ref().map(|id| id.as_str()).unwrap_or("<unknown>"),
        event.status
    );
    let result = match api.process_status_event(&event).await {
        Ok(TransitionOutcome::Applied(tag)) => JsonResponse::success(format!("Order tagged {tag}.")),
        Ok(TransitionOutcome::AlreadyApplied(tag)) => JsonResponse::success(format!("Order is already {tag}.")),
        Ok(TransitionOutcome::Superseded { requested, current }) => {
            JsonResponse::success(format!("Order is already {current}. Ignoring {requested}."))
        },
        Ok(TransitionOutcome::NoAction(status)) => JsonResponse::success(format!("No action for status {status}.")),
        Ok(TransitionOutcome::MissingOrderId) => JsonResponse::failure("Payment status has no order id."),
        Ok(TransitionOutcome::UnknownOrder(id)) => JsonResponse::failure(format!("Unknown order {id}.")),
        Err(e @ PaymentFlowError::MarkAsPaid { .. }) => {
            error!("💸️ {e}");
            JsonResponse::failure("Order tagged as paid, but could not be marked as paid.")
        },
        Err(e) => {
            error!("💸️ Could not apply payment status '{}'. {e}", event.status);
            JsonResponse::failure(e)
        },
    };
    HttpResponse::Ok().json(result)
}
