use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use payment_bridge_engine::{
    bridge_types::{OrderId, OrderSnapshot, TagSet},
    OrderManagementError,
    PaymentFlowApi,
};

use super::{
    helpers::{ipn_signature, post_request, send_request, shopify_signature, IPN_SECRET, SHOPIFY_SECRET},
    mocks::{untouchable_order_manager, MockOrderManager},
};
use crate::{
    config::{ServerOptions, WebhookSecrets},
    data_objects::JsonResponse,
    routes::PaymentStatusRoute,
};

const PATH: &str = "/webhooks/payment-status";
const FINISHED: &[u8] =
    br#"{"payment_id":5077125051,"payment_status":"finished","order_id":"5678123456","price_amount":49.99,"price_currency":"usd"}"#;

fn order_with_tags(tags: &str) -> OrderSnapshot {
    OrderSnapshot { id: "5678123456".into(), tags: TagSet::parse(tags), ..Default::default() }
}

fn configure_with(orders: MockOrderManager, secrets: WebhookSecrets) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let api = PaymentFlowApi::new(orders);
        cfg.app_data(web::Data::new(api))
            .app_data(web::Data::new(secrets))
            .app_data(web::Data::new(ServerOptions::default()))
            .service(PaymentStatusRoute::<MockOrderManager>::new());
    }
}

fn configure(orders: MockOrderManager) -> impl FnOnce(&mut ServiceConfig) {
    configure_with(orders, WebhookSecrets::new(SHOPIFY_SECRET, IPN_SECRET))
}

fn response(body: &str) -> JsonResponse {
    serde_json::from_str(body).expect("Response was not a JsonResponse")
}

#[actix_web::test]
async fn finished_payment_tags_the_order() {
    let _ = env_logger::try_init().ok();
    let mut orders = MockOrderManager::new();
    orders
        .expect_fetch_order()
        .times(1)
        .withf(|id| id.as_str() == "5678123456")
        .returning(|_| Ok(order_with_tags("vip")));
    orders
        .expect_write_tags()
        .times(1)
        .withf(|id, tags| id.as_str() == "5678123456" && tags.to_string() == "vip, crypto_paid")
        .returning(|_, _| Ok(()));
    orders.expect_mark_as_paid().never();
    let sig = ipn_signature(FINISHED);
    let (status, body) = post_request(PATH, FINISHED, Some(("x-nowpayments-sig", sig)), configure(orders)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response(&body), JsonResponse::success("Order tagged crypto_paid."));
}

#[actix_web::test]
async fn replayed_payment_writes_nothing() {
    let _ = env_logger::try_init().ok();
    let mut orders = MockOrderManager::new();
    orders.expect_fetch_order().times(1).returning(|_| Ok(order_with_tags("vip, crypto_paid")));
    orders.expect_write_tags().never();
    let sig = ipn_signature(FINISHED);
    let (status, body) = post_request(PATH, FINISHED, Some(("x-nowpayments-sig", sig)), configure(orders)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response(&body), JsonResponse::success("Order is already crypto_paid."));
}

#[actix_web::test]
async fn late_partial_payment_is_ignored() {
    let _ = env_logger::try_init().ok();
    let payload = br#"{"payment_status":"partially_paid","order_id":"5678123456"}"#;
    let mut orders = MockOrderManager::new();
    orders.expect_fetch_order().times(1).returning(|_| Ok(order_with_tags("crypto_paid")));
    orders.expect_write_tags().never();
    let sig = ipn_signature(payload);
    let (status, body) = post_request(PATH, payload, Some(("x-nowpayments-sig", sig)), configure(orders)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(response(&body).success);
}

#[actix_web::test]
async fn signature_is_key_order_and_case_insensitive() {
    let _ = env_logger::try_init().ok();
    // Same payload, keys in a different order. The signature covers the sorted form.
    let reordered =
        br#"{"order_id":"5678123456","price_currency":"usd","payment_status":"finished","price_amount":49.99,"payment_id":5077125051}"#;
    let mut orders = MockOrderManager::new();
    orders.expect_fetch_order().times(1).returning(|_| Ok(order_with_tags("")));
    orders.expect_write_tags().times(1).returning(|_, _| Ok(()));
    let sig = ipn_signature(FINISHED).to_uppercase();
    let (status, _) = post_request(PATH, reordered, Some(("x-nowpayments-sig", sig)), configure(orders)).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn tampered_payment_is_rejected() {
    let _ = env_logger::try_init().ok();
    let sig = ipn_signature(FINISHED);
    let tampered = String::from_utf8_lossy(FINISHED).replace("5678123456", "5678123999");
    let (status, body) = post_request(
        PATH,
        tampered.as_bytes(),
        Some(("x-nowpayments-sig", sig)),
        configure(untouchable_order_manager()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"error":"Unauthorized. Invalid webhook signature."}"#);
}

#[actix_web::test]
async fn shopify_style_signature_is_rejected() {
    let _ = env_logger::try_init().ok();
    let sig = shopify_signature(FINISHED);
    let (status, _) =
        post_request(PATH, FINISHED, Some(("x-nowpayments-sig", sig)), configure(untouchable_order_manager())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = post_request(PATH, FINISHED, None, configure(untouchable_order_manager())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn unknown_order_is_acknowledged() {
    let _ = env_logger::try_init().ok();
    let mut orders = MockOrderManager::new();
    orders
        .expect_fetch_order()
        .times(1)
        .returning(|id| Err(OrderManagementError::OrderNotFound(OrderId::from(id.as_str()))));
    orders.expect_write_tags().never();
    let sig = ipn_signature(FINISHED);
    let (status, body) = post_request(PATH, FINISHED, Some(("x-nowpayments-sig", sig)), configure(orders)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response(&body), JsonResponse::failure("Unknown order 5678123456."));
}

#[actix_web::test]
async fn downstream_failure_is_still_a_200() {
    let _ = env_logger::try_init().ok();
    let mut orders = MockOrderManager::new();
    orders.expect_fetch_order().times(1).returning(|_| Ok(order_with_tags("")));
    orders
        .expect_write_tags()
        .times(1)
        .returning(|_, _| Err(OrderManagementError::Unavailable("Shopify is down".into())));
    let sig = ipn_signature(FINISHED);
    let (status, body) = post_request(PATH, FINISHED, Some(("x-nowpayments-sig", sig)), configure(orders)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!response(&body).success);
}

#[actix_web::test]
async fn informational_statuses_make_no_calls() {
    let _ = env_logger::try_init().ok();
    let payload = br#"{"payment_status":"waiting","order_id":"5678123456"}"#;
    let sig = ipn_signature(payload);
    let (status, body) =
        post_request(PATH, payload, Some(("x-nowpayments-sig", sig)), configure(untouchable_order_manager())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response(&body), JsonResponse::success("No action for status waiting."));
}

#[actix_web::test]
async fn missing_order_id_is_acknowledged() {
    let _ = env_logger::try_init().ok();
    let payload = br#"{"payment_status":"finished"}"#;
    let sig = ipn_signature(payload);
    let (status, body) =
        post_request(PATH, payload, Some(("x-nowpayments-sig", sig)), configure(untouchable_order_manager())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response(&body), JsonResponse::failure("Payment status has no order id."));
}

#[actix_web::test]
async fn missing_secret_is_a_server_error() {
    let _ = env_logger::try_init().ok();
    let sig = ipn_signature(FINISHED);
    let (status, _) = post_request(
        PATH,
        FINISHED,
        Some(("x-nowpayments-sig", sig)),
        configure_with(untouchable_order_manager(), WebhookSecrets::new(SHOPIFY_SECRET, "   ")),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_web::test]
async fn only_post_is_allowed() {
    let _ = env_logger::try_init().ok();
    let (status, body) = send_request(TestRequest::get().uri(PATH), configure(untouchable_order_manager())).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body, r#"{"error":"Method not allowed"}"#);
}
