//! Webhook signature middleware for Actix Web.
//!
//! Both webhook senders sign the request body with a shared secret. This middleware checks the signature before the
//! request reaches the handler, so handlers can trust the body they receive.
//!
//! The secret for each [`SignatureScheme`] is looked up in the app's [`WebhookSecrets`] data at request time:
//! * No secret configured: the request fails with a 500, before the signature is looked at.
//! * Missing or invalid signature: the request fails with a 401.
//!
//! Only POST requests are checked. Any other method is passed straight through so that the resource can answer with
//! a 405.
//!
//! The body is read into memory to be verified, and then put back into the request for the handler.

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_http::h1;
use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::Method,
    web,
    Error,
};
use futures::future::LocalBoxFuture;
use log::{error, trace, warn};
use payment_bridge_engine::helpers::{SignatureScheme, WebhookVerificationContext};

use crate::{config::WebhookSecrets, errors::ServerError};

pub struct SignatureMiddlewareFactory {
    scheme: SignatureScheme,
}

impl SignatureMiddlewareFactory {
    pub fn new(scheme: SignatureScheme) -> Self {
        SignatureMiddlewareFactory { scheme }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SignatureMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = SignatureMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SignatureMiddlewareService { scheme: self.scheme, service: Rc::new(service) }))
    }
}

pub struct SignatureMiddlewareService<S> {
    scheme: SignatureScheme,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for SignatureMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let scheme = self.scheme;
        Box::pin(async move {
            if req.method() != Method::POST {
                return service.call(req).await;
            }
            trace!("🔐️ Checking {scheme:?} signature for {}", req.path());
            let secret = req
                .app_data::<web::Data<WebhookSecrets>>()
                .map(|secrets| secrets.secret_for(scheme).clone())
                .filter(|secret| secret.is_set())
                .ok_or_else(|| {
                    error!("🔐️ No secret is configured for {scheme:?} webhooks. Rejecting {}", req.path());
                    ServerError::Misconfigured("No webhook secret has been configured.".into())
                })?;
            let data = req.extract::<web::Bytes>().await.map_err(|e| {
                warn!("🔐️ Failed to extract request data: {:?}", e);
                ServerError::InvalidRequestBody("Failed to extract request data.".into())
            })?;
            let signature = req.headers().get(scheme.header_name()).and_then(|v| v.to_str().ok());
            let validated = WebhookVerificationContext::new(secret.reveal(), data.as_ref(), signature).verify(scheme);
            if validated {
                trace!("🔐️ Signature check for request ✅️");
                req.set_payload(bytes_to_payload(data));
                service.call(req).await
            } else {
                warn!("🔐️ Missing or invalid {} signature on {}. Denying access.", scheme.header_name(), req.path());
                Err(ServerError::Unauthenticated("Invalid webhook signature.".into()).into())
            }
        })
    }
}

fn bytes_to_payload(buf: web::Bytes) -> Payload {
    let (_, mut pl) = h1::Payload::create(true);
    pl.unread_data(buf);
    Payload::from(pl)
}
