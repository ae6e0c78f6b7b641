//! JSON response envelope.
//!
//! Every endpoint answers with the same shape:
//!
//! ```json
//! { "success": true, "message": "Products fetched successfully", "data": { ... } }
//! { "success": false, "message": "Invalid product ID", "error": "Bad Request" }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Uniform success/error wrapper.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    /// Successful outcome carrying `data`.
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            error: None,
        }
    }
}

impl Envelope<()> {
    /// Failed outcome. `error` holds the reason phrase of `status`.
    pub fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            error: Some(status.canonical_reason().unwrap_or("Error").to_owned()),
        }
    }
}

/// A successful handler result: status code plus envelope.
#[derive(Debug)]
pub struct ApiResponse<T> {
    status: StatusCode,
    envelope: Envelope<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            status: StatusCode::OK,
            envelope: Envelope::success(message, data),
        }
    }

    /// 201 Created.
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            envelope: Envelope::success(message, data),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.envelope)).into_response()
    }
}

/// Render a failure envelope with the given status.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(Envelope::failure(status, message))).into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_success_omits_error() {
        let envelope = Envelope::success("States fetched successfully", json!({"states": []}));
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(
            value,
            json!({
                "success": true,
                "message": "States fetched successfully",
                "data": {"states": []}
            })
        );
    }

    #[test]
    fn test_failure_carries_reason_phrase() {
        let envelope = Envelope::failure(StatusCode::NOT_FOUND, "Product not found or access denied");
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["success"], false);
        assert_eq!(value["message"], "Product not found or access denied");
        assert_eq!(value["error"], "Not Found");
        assert!(value.get("data").is_none());
    }

    #[test]
    fn test_created_status() {
        let response = ApiResponse::created("Product created successfully", json!({})).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
