use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use payment_bridge_engine::{
    bridge_types::{CreatedInvoice, NoteAttribute, OrderSnapshot, TagSet, INVOICE_ID_NOTE, INVOICE_URL_NOTE},
    InvoiceError,
    InvoiceFlowApi,
    InvoiceService,
};

use super::{
    helpers::{post_request, send_request, shopify_signature, IPN_SECRET, SHOPIFY_SECRET},
    mocks::{untouchable_order_manager, untouchable_processor, MockOrderManager, MockPaymentProcessor},
};
use crate::{
    config::{ServerOptions, WebhookSecrets},
    data_objects::JsonResponse,
    routes::OrderCreatedRoute,
};

const PATH: &str = "/webhooks/order-created";
const CALLBACK: &str = "https://bridge.example.com/webhooks/payment-status";
const INVOICE_URL: &str = "https://nowpayments.io/payment/?iid=4522625843";

const MANUAL_ORDER: &[u8] = br##"{
    "id": 5678123456,
    "name": "#1001",
    "gateway": "manual",
    "total_price": "49.99",
    "currency": "USD",
    "tags": "vip",
    "note_attributes": [{"name": "gift", "value": "yes"}]
}"##;

const STANDARD_ORDER: &[u8] = br#"{"id": 5678123457, "gateway": "standard", "total_price": "10.00", "currency": "USD"}"#;

fn stored_order() -> OrderSnapshot {
    OrderSnapshot {
        id: "5678123456".into(),
        name: Some("#1001".into()),
        gateway: Some("manual".into()),
        total_price: Some("49.99".into()),
        currency: Some("USD".into()),
        financial_status: Some("pending".into()),
        tags: TagSet::parse("vip"),
        note_attributes: vec![NoteAttribute::new("gift", "yes")],
    }
}

fn configure_with(
    orders: MockOrderManager,
    processor: MockPaymentProcessor,
    secrets: WebhookSecrets,
) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let api = InvoiceFlowApi::new(orders, InvoiceService::new(processor, CALLBACK));
        cfg.app_data(web::Data::new(api))
            .app_data(web::Data::new(secrets))
            .app_data(web::Data::new(ServerOptions::default()))
            .service(OrderCreatedRoute::<MockOrderManager, MockPaymentProcessor>::new());
    }
}

fn configure(orders: MockOrderManager, processor: MockPaymentProcessor) -> impl FnOnce(&mut ServiceConfig) {
    configure_with(orders, processor, WebhookSecrets::new(SHOPIFY_SECRET, IPN_SECRET))
}

fn response(body: &str) -> JsonResponse {
    serde_json::from_str(body).expect("Response was not a JsonResponse")
}

#[actix_web::test]
async fn manual_order_is_invoiced() {
    let _ = env_logger::try_init().ok();
    let mut orders = MockOrderManager::new();
    orders.expect_fetch_order().times(1).withf(|id| id.as_str() == "5678123456").returning(|_| Ok(stored_order()));
    orders
        .expect_write_note_attributes()
        .times(1)
        .withf(|id, attrs| {
            id.as_str() == "5678123456" &&
                attrs.to_vec() ==
                    vec![
                        NoteAttribute::new("gift", "yes"),
                        NoteAttribute::new(INVOICE_URL_NOTE, INVOICE_URL),
                        NoteAttribute::new(INVOICE_ID_NOTE, "4522625843"),
                    ]
        })
        .returning(|_, _| Ok(()));
    orders.expect_write_tags().never();
    let mut processor = MockPaymentProcessor::new();
    processor
        .expect_create_invoice()
        .times(1)
        .withf(|inv| {
            inv.price_amount.to_string() == "49.99" &&
                inv.price_currency == "USD" &&
                inv.order_id.as_str() == "5678123456" &&
                inv.callback_url == CALLBACK
        })
        .returning(|_| {
            Ok(CreatedInvoice { id: Some("4522625843".into()), invoice_url: Some(INVOICE_URL.into()) })
        });

    let sig = shopify_signature(MANUAL_ORDER);
    let (status, body) =
        post_request(PATH, MANUAL_ORDER, Some(("X-Shopify-Hmac-SHA256", sig)), configure(orders, processor)).await;
    assert_eq!(status, StatusCode::OK);
    let res = response(&body);
    assert!(res.success);
    assert_eq!(res.message, format!("Invoice created: {INVOICE_URL}"));
}

#[actix_web::test]
async fn large_orders_are_accepted() {
    let _ = env_logger::try_init().ok();
    let padding = "x".repeat(400_000);
    let large_order = serde_json::json!({
        "id": 5678123456u64,
        "name": "#1001",
        "gateway": "manual",
        "total_price": "49.99",
        "currency": "USD",
        "line_items": [{"title": "Gift hamper", "properties": [{"name": "message", "value": padding}]}]
    })
    .to_string();
    assert!(large_order.len() > 262_144);
    let mut orders = MockOrderManager::new();
    orders.expect_fetch_order().times(1).returning(|_| {
        let mut order = stored_order();
        order.note_attributes.push(NoteAttribute::new(INVOICE_URL_NOTE, INVOICE_URL));
        Ok(order)
    });
    orders.expect_write_note_attributes().never();
    let sig = shopify_signature(large_order.as_bytes());
    let (status, body) = post_request(
        PATH,
        large_order.as_bytes(),
        Some(("X-Shopify-Hmac-SHA256", sig)),
        configure(orders, untouchable_processor()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response(&body), JsonResponse::success("Order has already been invoiced."));
}

#[actix_web::test]
async fn already_invoiced_order_is_skipped() {
    let _ = env_logger::try_init().ok();
    let mut orders = MockOrderManager::new();
    orders.expect_fetch_order().times(1).returning(|_| {
        let mut order = stored_order();
        order.note_attributes.push(NoteAttribute::new(INVOICE_URL_NOTE, INVOICE_URL));
        Ok(order)
    });
    orders.expect_write_note_attributes().never();
    let sig = shopify_signature(MANUAL_ORDER);
    let (status, body) = post_request(
        PATH,
        MANUAL_ORDER,
        Some(("X-Shopify-Hmac-SHA256", sig)),
        configure(orders, untouchable_processor()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response(&body), JsonResponse::success("Order has already been invoiced."));
}

#[actix_web::test]
async fn other_gateways_make_no_calls() {
    let _ = env_logger::try_init().ok();
    let sig = shopify_signature(STANDARD_ORDER);
    let (status, body) = post_request(
        PATH,
        STANDARD_ORDER,
        Some(("X-Shopify-Hmac-SHA256", sig)),
        configure(untouchable_order_manager(), untouchable_processor()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(response(&body).success);
}

#[actix_web::test]
async fn tampered_body_is_rejected() {
    let _ = env_logger::try_init().ok();
    let sig = shopify_signature(MANUAL_ORDER);
    let tampered = String::from_utf8_lossy(MANUAL_ORDER).replace("49.99", "0.01");
    let (status, body) = post_request(
        PATH,
        tampered.as_bytes(),
        Some(("X-Shopify-Hmac-SHA256", sig)),
        configure(untouchable_order_manager(), untouchable_processor()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"error":"Unauthorized. Invalid webhook signature."}"#);
}

#[actix_web::test]
async fn missing_signature_is_rejected() {
    let _ = env_logger::try_init().ok();
    let (status, _) =
        post_request(PATH, MANUAL_ORDER, None, configure(untouchable_order_manager(), untouchable_processor())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn signature_from_the_wrong_scheme_is_rejected() {
    let _ = env_logger::try_init().ok();
    // Right header, but signed the NOWPayments way
    let sig = super::helpers::ipn_signature(MANUAL_ORDER);
    let (status, _) = post_request(
        PATH,
        MANUAL_ORDER,
        Some(("X-Shopify-Hmac-SHA256", sig)),
        configure(untouchable_order_manager(), untouchable_processor()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn missing_secret_is_a_server_error() {
    let _ = env_logger::try_init().ok();
    let sig = shopify_signature(MANUAL_ORDER);
    let (status, body) = post_request(
        PATH,
        MANUAL_ORDER,
        Some(("X-Shopify-Hmac-SHA256", sig)),
        configure_with(untouchable_order_manager(), untouchable_processor(), WebhookSecrets::new("", IPN_SECRET)),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("misconfigured"));
}

#[actix_web::test]
async fn only_post_is_allowed() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri(PATH);
    let (status, _) = send_request(req, configure(untouchable_order_manager(), untouchable_processor())).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    let req = TestRequest::put().uri(PATH).set_payload(MANUAL_ORDER.to_vec());
    let (status, _) = send_request(req, configure(untouchable_order_manager(), untouchable_processor())).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[actix_web::test]
async fn malformed_payload_is_acknowledged() {
    let _ = env_logger::try_init().ok();
    let payload = br#"{"gateway": "manual"}"#;
    let sig = shopify_signature(payload);
    let (status, body) = post_request(
        PATH,
        payload,
        Some(("X-Shopify-Hmac-SHA256", sig)),
        configure(untouchable_order_manager(), untouchable_processor()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response(&body), JsonResponse::failure("Malformed order payload."));
}

#[actix_web::test]
async fn invoice_failure_is_still_a_200() {
    let _ = env_logger::try_init().ok();
    let mut orders = MockOrderManager::new();
    orders.expect_fetch_order().times(1).returning(|_| Ok(stored_order()));
    orders.expect_write_note_attributes().never();
    let mut processor = MockPaymentProcessor::new();
    processor
        .expect_create_invoice()
        .times(1)
        .returning(|_| Err(InvoiceError::Unavailable("connection refused".into())));
    let sig = shopify_signature(MANUAL_ORDER);
    let (status, body) =
        post_request(PATH, MANUAL_ORDER, Some(("X-Shopify-Hmac-SHA256", sig)), configure(orders, processor)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!response(&body).success);
}
