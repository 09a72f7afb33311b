use std::{
    fmt::Display,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue, Method},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use log::{error, info};
use parking_lot::Mutex;
use rating_party_core::{Claims, Identity};
use uuid::Uuid;

use crate::errors::{ErrorBody, ErrorReport};

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// State belonging to a single request.
///
/// Created by [track_requests] before any extractor runs. Authentication fills
/// in the claims, the gate fills in the identity, and once the handler is done
/// the middleware reads it back to log the request and shape error bodies.
#[derive(Debug)]
pub struct RequestContext {
    pub id: Uuid,
    pub method: Method,
    pub path: String,
    started_at: Instant,
    claims: Mutex<Option<Claims>>,
    identity: Mutex<Option<Identity>>,
    failed: Mutex<bool>,
}

impl RequestContext {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            method,
            path: path.into(),
            started_at: Instant::now(),
            claims: Default::default(),
            identity: Default::default(),
            failed: Default::default(),
        }
    }

    pub fn set_claims(&self, claims: Claims) {
        *self.claims.lock() = Some(claims);
    }

    pub fn claims(&self) -> Option<Claims> {
        self.claims.lock().clone()
    }

    pub fn set_identity(&self, identity: Identity) {
        *self.identity.lock() = Some(identity);
    }

    pub fn identity(&self) -> Option<Identity> {
        *self.identity.lock()
    }

    pub fn mark_failed(&self) {
        *self.failed.lock() = true;
    }

    pub fn has_failed(&self) -> bool {
        *self.failed.lock()
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

/// Displays who made a request, for the request log
struct Caller(Option<Identity>);

impl Display for Caller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            None | Some(Identity::Anonymous) => write!(f, "anonymous"),
            Some(Identity::Admin) => write!(f, "admin"),
            Some(Identity::Participant { participant_id, .. }) => {
                write!(f, "participant {}", participant_id)
            }
        }
    }
}

/// Tracks every request: attaches a [RequestContext], stamps the request id
/// into error bodies and headers, and logs the outcome.
pub async fn track_requests(mut request: Request, next: Next) -> Response {
    let context = Arc::new(RequestContext::new(
        request.method().clone(),
        request.uri().path(),
    ));

    request.extensions_mut().insert(context.clone());

    let mut response = next.run(request).await;

    if let Some(report) = response.extensions_mut().remove::<ErrorReport>() {
        context.mark_failed();

        if let Some(detail) = &report.detail {
            error!("[{}] {}", context.id, detail);
        }

        let status = response.status();
        let body = ErrorBody {
            error: report.message,
            request_id: Some(context.id),
        };

        response = (status, Json(body)).into_response();
    }

    if let Ok(value) = HeaderValue::from_str(&context.id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    info!(
        "{} {} {} in {:?}{} [{}] {}",
        context.method,
        context.path,
        response.status().as_u16(),
        context.elapsed(),
        if context.has_failed() { " (failed)" } else { "" },
        context.id,
        Caller(context.identity()),
    );

    response
}
