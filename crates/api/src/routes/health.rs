//! Liveness, readiness and root endpoints.

use axum::{Json, extract::State, http::StatusCode};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::db;
use crate::state::AppState;

/// Liveness payload.
#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub timestamp: String,
    /// Seconds since the server started.
    pub uptime: f64,
    pub environment: String,
    pub version: &'static str,
}

/// Root endpoint payload.
#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub message: &'static str,
    pub status: &'static str,
    pub timestamp: String,
    pub docs: &'static str,
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Liveness health check endpoint.
///
/// Reports process metadata only; does not check dependencies.
pub async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "OK",
        timestamp: now(),
        uptime: state.uptime().as_secs_f64(),
        environment: state.config().environment.clone(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity before returning OK.
/// Returns 503 Service Unavailable if the database is not reachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match db::ping(state.pool()).await {
        Ok(()) => StatusCode::OK,
        Err(err) => {
            tracing::warn!(error = %err, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// `GET /` - server banner.
pub async fn root() -> Json<ServerInfo> {
    Json(ServerInfo {
        message: "myNGO API Server",
        status: "running",
        timestamp: now(),
        docs: "/api",
    })
}
