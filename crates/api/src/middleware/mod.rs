//! HTTP middleware stack for the API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (HTTP transaction, hub per request)
//! 2. `TraceLayer` (request span with `request_id`)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers (helmet-style)
//! 5. CORS
//! 6. 429 envelope rewrite
//! 7. Rate limiting (governor)
//! 8. Compression
//! 9. Body size limit
//! 10. Bearer auth (product routes only)

pub mod auth;
pub mod cors;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;

pub use auth::{RequireUser, require_auth};
pub use cors::cors_layer;
pub use rate_limit::{api_rate_limiter, rate_limit_envelope};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
