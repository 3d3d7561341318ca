//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                                    - Liveness check
//! GET    /health/ready                              - Readiness (catalog reachable)
//!
//! # Page sessions
//! POST   /api/sessions                              - Open a session (loads categories + all plants)
//! GET    /api/sessions/{id}                         - Full page state
//! DELETE /api/sessions/{id}                         - Close a session
//! PUT    /api/sessions/{id}/category                - Select a category ({"category": "all" | id})
//! GET    /api/sessions/{id}/products                - Current product grid
//! POST   /api/sessions/{id}/products/retry          - Refetch the product grid
//! POST   /api/sessions/{id}/menu                    - Mobile menu ({"action": "toggle" | "close" | "escape"})
//!
//! # Cart
//! GET    /api/sessions/{id}/cart                    - Cart contents
//! POST   /api/sessions/{id}/cart/items              - Add one unit of a product
//! DELETE /api/sessions/{id}/cart/items/{product_id} - Remove a product's line
//!
//! # Products
//! GET    /api/products/{id}                         - Product detail (modal)
//! ```

pub mod cart;
pub mod products;
pub mod sessions;
pub mod views;

use std::time::Duration;

use axum::{
    Router,
    extract::State,
    http::{Method, Request, Response, StatusCode, header},
    middleware,
    routing::{get, post, put},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::catalog::CatalogSource;
use crate::middleware::request_context_middleware;
use crate::state::AppState;

/// Create the session routes router.
pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(sessions::create))
        .route("/{id}", get(sessions::show).delete(sessions::destroy))
        .route("/{id}/category", put(sessions::select_category))
        .route("/{id}/products", get(sessions::products))
        .route("/{id}/products/retry", post(sessions::retry_products))
        .route("/{id}/menu", post(sessions::menu))
        .route("/{id}/cart", get(cart::show))
        .route("/{id}/cart/items", post(cart::add))
        .route(
            "/{id}/cart/items/{product_id}",
            axum::routing::delete(cart::remove),
        )
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/sessions", session_routes())
        .route("/api/products/{id}", get(products::show))
}

/// Build the application router with tracing, request ids and CORS.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes())
        .layer(cors)
        .layer(middleware::from_fn(request_context_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        session_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(|response: &Response<_>, latency: Duration, span: &Span| {
                    span.record("status", response.status().as_u16());
                    span.record(
                        "latency_ms",
                        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                    );
                    DefaultOnResponse::default().on_response(response, latency, span);
                }),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the catalog API cannot list categories.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.catalog().list_categories().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "catalog not ready");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
