//! HTTP middleware stack for the API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transactions)
//! 2. `TraceLayer` (request span with method, uri, status, latency)
//! 3. Request ID (propagate or create `x-request-id`)
//! 4. CORS (only when origins are configured)
//! 5. Rate limiting on `/api/auth/*` (governor)
//!
//! Authentication is an extractor, not a layer: handlers that need a caller
//! take [`RequireAuth`].

pub mod auth;
pub mod rate_limit;
pub mod request_id;

pub use auth::{AuthRejection, RequireAuth};
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
