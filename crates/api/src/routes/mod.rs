//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Server banner
//! GET  /health                    - Liveness check
//! GET  /health/ready              - Readiness check (database)
//!
//! # Mounted under /api and, for older clients, at the root
//! GET    /states                  - Active states (public)
//! GET    /products                - Caller's products (auth)
//! GET    /products/tags/all       - Caller's tags (auth)
//! GET    /products/{id}           - One product (auth)
//! POST   /products                - Create product (auth)
//! PUT    /products/{id}           - Replace product (auth)
//! DELETE /products/{id}           - Delete product (auth)
//! ```

pub mod health;
pub mod products;
pub mod states;

use axum::{
    Router,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::Response,
    routing::get,
};

use crate::middleware::require_auth;
use crate::response::error_response;
use crate::state::AppState;

/// Create the product routes router. Every route requires a bearer token.
pub fn product_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route("/tags/all", get(products::tags))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::destroy),
        )
        .route_layer(from_fn_with_state(state, require_auth))
}

/// Create the resource routes shared by the `/api` and legacy mounts.
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/states", get(states::index))
        .nest("/products", product_routes(state))
}

/// Create all routes for the API.
pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api_routes(state.clone()))
        // Legacy routes without the /api prefix
        .merge(api_routes(state))
        .fallback(not_found)
}

/// Envelope for unmatched paths.
async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Route not found")
}
