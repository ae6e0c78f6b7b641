//! myNGO API library.
//!
//! This crate provides the API server as a library, allowing the router to be
//! exercised in-process by tests and reused by the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;

use axum::{
    Router,
    body::Body,
    extract::DefaultBodyLimit,
    http::Request,
    middleware::from_fn,
};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::middleware::{
    api_rate_limiter, cors_layer, rate_limit_envelope, request_id_middleware,
    security_headers_middleware,
};
use crate::state::AppState;

/// Build the complete application: routes plus the middleware stack.
///
/// Layers run outermost first: Sentry, tracing, request id, security headers,
/// CORS, the 429 envelope, rate limiting, compression, body limit.
pub fn app(state: AppState) -> Router {
    let config = state.config();
    let body_limit = config.max_body_bytes;
    let rate_limiter = api_rate_limiter(&config.rate_limit);
    let cors = cors_layer(&config.cors_origins);

    routes::routes(state.clone())
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(rate_limiter)
        .layer(from_fn(rate_limit_envelope))
        .layer(cors)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::<Request<Body>>::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
