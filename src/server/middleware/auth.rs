//! Authorization middleware
//!
//! `Authorize::new(action, feature)` wraps a route with the decision engine.
//! On allow, the decision is attached to the request's extensions for the
//! downstream handler; on deny, the handler never runs.
//!
//! For mutations on the users feature the escalation guard needs the proposed
//! role from the JSON body and the target id from the path, so the body is
//! buffered, inspected, and replayed into the request payload.

use crate::auth::rbac::AccessRequest;
use crate::core::models::role::{ACTION_CREATE, ACTION_DELETE, ACTION_UPDATE, FEATURE_USERS};
use crate::server::state::AppState;
use crate::utils::error::GateError;
use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::header;
use actix_web::{HttpMessage, ResponseError, web};
use futures::future::{Ready, ready};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use uuid::Uuid;

/// Authorization middleware factory for a fixed action and feature
pub struct Authorize {
    action: &'static str,
    feature: &'static str,
}

impl Authorize {
    /// Guard a route with an action/feature pair
    pub fn new(action: &'static str, feature: &'static str) -> Self {
        Self { action, feature }
    }
}

impl<S, B> Transform<S, ServiceRequest> for Authorize
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = AuthorizeService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthorizeService {
            service: Rc::new(service),
            action: self.action,
            feature: self.feature,
        }))
    }
}

/// Service implementation for the authorization middleware
pub struct AuthorizeService<S> {
    service: Rc<S>,
    action: &'static str,
    feature: &'static str,
}

impl<S, B> Service<ServiceRequest> for AuthorizeService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let action = self.action;
        let feature = self.feature;

        Box::pin(async move {
            let state = match req.app_data::<web::Data<AppState>>().cloned() {
                Some(state) => state,
                None => {
                    let response = GateError::internal("application state missing").error_response();
                    return Ok(req.into_response(response).map_into_right_body());
                }
            };

            let token = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.strip_prefix("Bearer "))
                .map(str::to_owned);

            let target_user_id = req
                .match_info()
                .get("id")
                .and_then(|id| Uuid::parse_str(id).ok());

            // Only the escalation guard needs to see inside the body.
            let mut proposed_role = None;
            if feature == FEATURE_USERS
                && matches!(action, ACTION_CREATE | ACTION_UPDATE | ACTION_DELETE)
            {
                let body = req.extract::<web::Bytes>().await?;
                if !body.is_empty() {
                    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(&body) {
                        proposed_role = value
                            .get("role")
                            .and_then(|role| role.as_str())
                            .map(str::to_owned);
                    }
                }
                req.set_payload(bytes_to_payload(body));
            }

            let decision = match state
                .auth
                .engine()
                .decide(AccessRequest {
                    token: token.as_deref(),
                    action,
                    feature,
                    proposed_role: proposed_role.as_deref(),
                    target_user_id,
                })
                .await
            {
                Ok(decision) => decision,
                Err(err) => {
                    let response = err.error_response();
                    return Ok(req.into_response(response).map_into_right_body());
                }
            };

            req.extensions_mut().insert(decision);
            service
                .call(req)
                .await
                .map(ServiceResponse::map_into_left_body)
        })
    }
}

/// Rebuild a request payload from buffered bytes so downstream extractors
/// still see the body.
fn bytes_to_payload(buf: web::Bytes) -> actix_web::dev::Payload {
    let (_, mut payload) = actix_http::h1::Payload::create(true);
    payload.unread_data(buf);
    actix_web::dev::Payload::from(payload)
}
