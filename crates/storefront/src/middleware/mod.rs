//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, added in `main`)
//! 2. `TraceLayer` (request tracing)
//! 3. Request context (request id and session id on span and Sentry scope)
//! 4. CORS (the storefront page calls the API from the browser)

pub mod context;

pub use context::{REQUEST_ID_HEADER, request_context_middleware};
