//! Per-request correlation context.
//!
//! Every request is tagged with a request id and, for session routes, the
//! page session it acts on. Both land on the `http_request` span and the
//! Sentry scope, so a cart or category error can be traced back to the
//! shopper's session. The request id is echoed in `x-request-id`.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream request id that is reused as-is.
const MAX_REQUEST_ID_LEN: usize = 64;

const SESSION_PATH_PREFIX: &str = "/api/sessions/";

#[derive(Debug, Clone, PartialEq, Eq)]
struct RequestId(String);

/// Reuse an upstream id when it is short printable ASCII, otherwise mint one.
fn request_id(request: &Request) -> RequestId {
    let upstream = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|id| {
            !id.is_empty()
                && id.len() <= MAX_REQUEST_ID_LEN
                && id.bytes().all(|b| b.is_ascii_graphic())
        });

    RequestId(upstream.map_or_else(|| Uuid::new_v4().to_string(), String::from))
}

/// Session id from a `/api/sessions/{id}/...` path.
fn session_id(path: &str) -> Option<Uuid> {
    let rest = path.strip_prefix(SESSION_PATH_PREFIX)?;
    let segment = rest.split('/').next()?;
    Uuid::parse_str(segment).ok()
}

/// Middleware that attaches the correlation context to each request.
pub async fn request_context_middleware(request: Request, next: Next) -> Response {
    let id = request_id(&request);
    let session = session_id(request.uri().path());

    let span = Span::current();
    span.record("request_id", id.0.as_str());
    if let Some(session) = session {
        span.record("session_id", tracing::field::display(session));
    }

    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &id.0);
        if let Some(session) = session {
            scope.set_tag("session_id", session);
        }
    });

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&id.0) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
