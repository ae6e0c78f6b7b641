//! In-process router tests.
//!
//! These run against a pool that never connects, so they only cover paths
//! decided before the database: authentication, input validation, envelopes,
//! headers, rate limiting and failure handling.
//!
//! Run with: cargo test -p myngo-integration-tests

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::http::{Method, Request, StatusCode, header};
use serde_json::json;

use myngo_integration_tests::{offline_app, request, send, token_for};

// ============================================================================
// Health & Root
// ============================================================================

#[tokio::test]
async fn test_health_reports_process_metadata() {
    let app = offline_app(&[]);

    let resp = send(&app, request(Method::GET, "/health", None, None)).await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["status"], "OK");
    assert_eq!(resp.body["environment"], "test");
    assert!(resp.body["uptime"].is_number());
    assert!(resp.body["timestamp"].is_string());
    assert!(resp.body["version"].is_string());
}

#[tokio::test]
async fn test_root_banner() {
    let app = offline_app(&[]);

    let resp = send(&app, request(Method::GET, "/", None, None)).await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["message"], "myNGO API Server");
    assert_eq!(resp.body["status"], "running");
    assert_eq!(resp.body["docs"], "/api");
}

#[tokio::test]
async fn test_readiness_without_database() {
    let app = offline_app(&[]);

    let resp = send(&app, request(Method::GET, "/health/ready", None, None)).await;

    assert_eq!(resp.status, StatusCode::SERVICE_UNAVAILABLE);
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_products_require_token() {
    let app = offline_app(&[]);

    for uri in ["/api/products", "/products", "/api/products/tags/all", "/api/products/1"] {
        let resp = send(&app, request(Method::GET, uri, None, None)).await;

        assert_eq!(resp.status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(resp.body["success"], false);
        assert_eq!(resp.body["message"], "User authentication required");
        assert_eq!(resp.body["error"], "Unauthorized");
    }
}

#[tokio::test]
async fn test_create_without_token_is_rejected_before_validation() {
    let app = offline_app(&[]);

    let resp = send(
        &app,
        request(Method::POST, "/api/products", None, Some(&json!({"name": "Jar"}))),
    )
    .await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bad_signature_rejected() {
    let app = offline_app(&[]);
    let mut token = token_for(1);
    token.push('x');

    let resp = send(&app, request(Method::GET, "/api/products", Some(&token), None)).await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body["message"], "User authentication required");
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn test_create_missing_category() {
    let app = offline_app(&[]);
    let token = token_for(1);

    let resp = send(
        &app,
        request(
            Method::POST,
            "/api/products",
            Some(&token),
            Some(&json!({"name": "Honey Jar", "description": "Raw honey"})),
        ),
    )
    .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["success"], false);
    assert_eq!(resp.body["message"], "Name, description, and category are required");
    assert_eq!(resp.body["error"], "Bad Request");
    assert!(resp.body.get("data").is_none());
}

#[tokio::test]
async fn test_create_non_numeric_business_id() {
    let app = offline_app(&[]);
    let token = token_for(1);

    let resp = send(
        &app,
        request(
            Method::POST,
            "/api/products",
            Some(&token),
            Some(&json!({"name": "x", "description": "d", "category": "c", "businessId": "acme"})),
        ),
    )
    .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["success"], false);
    assert_eq!(resp.body["message"], "Invalid business ID");
}

#[tokio::test]
async fn test_create_malformed_json() {
    let app = offline_app(&[]);
    let token = token_for(1);

    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/products")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from("{\"name\": "))
        .unwrap();
    let resp = send(&app, req).await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["success"], false);
}

#[tokio::test]
async fn test_invalid_product_id() {
    let app = offline_app(&[]);
    let token = token_for(1);
    let body = json!({"name": "n", "description": "d", "category": "c"});

    for (method, body) in [
        (Method::GET, None),
        (Method::PUT, Some(&body)),
        (Method::DELETE, None),
    ] {
        let resp = send(&app, request(method.clone(), "/api/products/abc", Some(&token), body)).await;

        assert_eq!(resp.status, StatusCode::BAD_REQUEST, "{method}");
        assert_eq!(resp.body["message"], "Invalid product ID");
    }
}

#[tokio::test]
async fn test_body_over_limit() {
    let app = offline_app(&[("MAX_BODY_SIZE", "64b")]);
    let token = token_for(1);
    let description = "x".repeat(256);

    let resp = send(
        &app,
        request(
            Method::POST,
            "/api/products",
            Some(&token),
            Some(&json!({"name": "n", "description": description, "category": "c"})),
        ),
    )
    .await;

    assert_eq!(resp.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(resp.body["success"], false);
}

// ============================================================================
// Envelopes & Failures
// ============================================================================

#[tokio::test]
async fn test_unknown_route_envelope() {
    let app = offline_app(&[]);

    let resp = send(&app, request(Method::GET, "/api/nope", None, None)).await;

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.body["success"], false);
    assert_eq!(resp.body["error"], "Not Found");
}

#[tokio::test]
async fn test_database_failure_is_generic() {
    let app = offline_app(&[]);

    let resp = send(&app, request(Method::GET, "/api/states", None, None)).await;

    assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.body["success"], false);
    assert_eq!(resp.body["message"], "Internal server error");
}

// ============================================================================
// Middleware
// ============================================================================

#[tokio::test]
async fn test_security_headers() {
    let app = offline_app(&[]);

    let resp = send(&app, request(Method::GET, "/health", None, None)).await;

    let csp = resp.headers[header::CONTENT_SECURITY_POLICY].to_str().unwrap();
    assert!(csp.contains("default-src 'self'"));
    assert!(csp.contains("img-src 'self' data: https:"));
    assert_eq!(resp.headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    assert_eq!(resp.headers[header::X_FRAME_OPTIONS], "SAMEORIGIN");
    assert!(resp.headers.get("cross-origin-embedder-policy").is_none());
}

#[tokio::test]
async fn test_request_id() {
    let app = offline_app(&[]);

    let generated = send(&app, request(Method::GET, "/health", None, None)).await;
    let id = generated.headers["x-request-id"].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(id).is_ok());

    let req = Request::builder()
        .uri("/health")
        .header("x-request-id", "upstream-123")
        .body(axum::body::Body::empty())
        .unwrap();
    let echoed = send(&app, req).await;
    assert_eq!(echoed.headers["x-request-id"], "upstream-123");
}

#[tokio::test]
async fn test_cors_preflight() {
    let app = offline_app(&[]);

    let req = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/products")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization,content-type")
        .body(axum::body::Body::empty())
        .unwrap();
    let resp = send(&app, req).await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(
        resp.headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:5173"
    );
    assert_eq!(resp.headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
}

#[tokio::test]
async fn test_cors_unknown_origin() {
    let app = offline_app(&[]);

    let req = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "https://evil.test")
        .body(axum::body::Body::empty())
        .unwrap();
    let resp = send(&app, req).await;

    assert!(resp.headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

#[tokio::test]
async fn test_rate_limit_envelope() {
    let app = offline_app(&[("RATE_LIMIT_MAX_REQUESTS", "2")]);

    for _ in 0..2 {
        let resp = send(&app, request(Method::GET, "/health", None, None)).await;
        assert_eq!(resp.status, StatusCode::OK);
    }

    let resp = send(&app, request(Method::GET, "/health", None, None)).await;

    assert_eq!(resp.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(resp.body["success"], false);
    assert_eq!(
        resp.body["message"],
        "Too many requests from this IP, please try again later."
    );
    assert_eq!(resp.body["error"], "Too Many Requests");
}
