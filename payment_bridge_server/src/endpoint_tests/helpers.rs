use actix_web::{body::to_bytes, http::StatusCode, test, test::TestRequest, web::ServiceConfig, App};
use log::debug;
use payment_bridge_engine::helpers::{sign, SignatureScheme};

pub const SHOPIFY_SECRET: &str = "shopify-webhook-secret";
pub const IPN_SECRET: &str = "nowpayments-ipn-secret";

pub fn shopify_signature(body: &[u8]) -> String {
    sign(body, SHOPIFY_SECRET, SignatureScheme::ShopifyHmacSha256).expect("Failed to sign body")
}

pub fn ipn_signature(body: &[u8]) -> String {
    sign(body, IPN_SECRET, SignatureScheme::NowPaymentsHmacSha512).expect("Failed to sign body")
}

/// Sends `req` through an app set up by `configure`, and returns the status and body, whether the request was handled
/// or rejected by middleware.
pub async fn send_request<F>(req: TestRequest, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    match test::try_call_service(&service, req.to_request()).await {
        Ok(res) => {
            let status = res.status();
            let body = to_bytes(res.into_body()).await.map_err(|_| "body error").expect("Could not read body");
            (status, String::from_utf8_lossy(&body).into_owned())
        },
        Err(e) => {
            let res = e.error_response();
            let status = res.status();
            let body = to_bytes(res.into_body()).await.map_err(|_| "body error").expect("Could not read body");
            (status, String::from_utf8_lossy(&body).into_owned())
        },
    }
}

pub async fn post_request<F>(
    path: &str,
    body: &[u8],
    signature: Option<(&str, String)>,
    configure: F,
) -> (StatusCode, String)
where
    F: FnOnce(&mut ServiceConfig),
{
    let mut req =
        TestRequest::post().uri(path).insert_header(("Content-Type", "application/json")).set_payload(body.to_vec());
    if let Some(header) = signature {
        req = req.insert_header(header);
    }
    send_request(req, configure).await
}
