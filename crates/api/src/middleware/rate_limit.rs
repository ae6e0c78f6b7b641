//! Per-client rate limiting using governor and `tower_governor`.
//!
//! One limiter guards the whole API: `RATE_LIMIT_MAX_REQUESTS` per
//! `RATE_LIMIT_WINDOW_MS`, keyed by client IP. The full allowance is available
//! as a burst and refills evenly across the window.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request},
    http::{StatusCode, header::CONTENT_LENGTH},
    middleware::Next,
    response::Response,
};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

use crate::config::RateLimitConfig;
use crate::response::error_response;

/// Message returned once a client exceeds its allowance.
pub const RATE_LIMIT_MESSAGE: &str = "Too many requests from this IP, please try again later.";

// =============================================================================
// Client IP Key Extractor
// =============================================================================

/// Key extractor that prefers proxy headers, then the peer address.
///
/// Requests without any usable address (in-process tests, for example) share
/// a single unspecified-address bucket.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor;

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &axum::http::Request<T>) -> Result<Self::Key, GovernorError> {
        let headers = req.headers();

        // X-Forwarded-For (first IP in the chain)
        if let Some(ip) = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
        {
            return Ok(ip);
        }

        for name in ["x-real-ip", "cf-connecting-ip"] {
            if let Some(ip) = headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<IpAddr>().ok())
            {
                return Ok(ip);
            }
        }

        if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
            return Ok(addr.ip());
        }

        Ok(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
    }
}

// =============================================================================
// Rate Limiter Configuration
// =============================================================================

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create the API rate limiter from configuration.
///
/// # Panics
///
/// This function will not panic. `RateLimitConfig` only holds a non-zero
/// request count and a replenish interval of at least one millisecond, which
/// `GovernorConfigBuilder` always accepts.
#[must_use]
pub fn api_rate_limiter(limit: &RateLimitConfig) -> RateLimiterLayer {
    let replenish_ms = u64::try_from(limit.replenish_interval().as_millis()).unwrap_or(u64::MAX);

    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_millisecond(replenish_ms)
        .burst_size(limit.max_requests())
        .finish()
        .expect("rate limiter config with non-zero period and burst is valid");
    GovernorLayer::new(Arc::new(config))
}

/// Rewrite the limiter's plain-text 429 into the standard envelope.
///
/// Must wrap the rate limit layer. Headers such as `retry-after` are kept.
pub async fn rate_limit_envelope(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    if response.status() != StatusCode::TOO_MANY_REQUESTS {
        return response;
    }

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(CONTENT_LENGTH);
    let envelope = error_response(StatusCode::TOO_MANY_REQUESTS, RATE_LIMIT_MESSAGE);
    let (envelope_parts, body) = envelope.into_parts();
    parts.headers.extend(envelope_parts.headers);

    Response::from_parts(parts, body)
}
