//! Unified error handling with Sentry integration.
//!
//! Handlers return `Result<T, AppError>`. Server errors are captured to Sentry
//! and logged before the client receives a generic failure envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::InvalidProduct;
use crate::response::error_response;

/// Message returned for every request without a resolved caller.
pub const AUTH_REQUIRED: &str = "User authentication required";

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Resource not found, or owned by someone else.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request body exceeds the configured limit.
    #[error("Payload too large")]
    PayloadTooLarge,
}

impl AppError {
    /// The product does not exist or is not the caller's.
    #[must_use]
    pub fn product_not_found() -> Self {
        Self::NotFound("Product not found or access denied".to_owned())
    }

    /// A product id path segment is not a positive integer.
    #[must_use]
    pub fn invalid_product_id() -> Self {
        Self::BadRequest("Invalid product ID".to_owned())
    }

    /// No caller identity could be resolved.
    #[must_use]
    pub fn auth_required() -> Self {
        Self::Unauthorized(AUTH_REQUIRED.to_owned())
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Database(err) => match err {
                RepositoryError::Conflict(_) => StatusCode::CONFLICT,
                RepositoryError::InvalidReference(_) => StatusCode::BAD_REQUEST,
                RepositoryError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    // Client-facing message; never exposes internals.
    fn message(&self) -> String {
        match self {
            Self::Database(err) => match err {
                RepositoryError::Conflict(_) => "A product with this slug already exists".to_owned(),
                RepositoryError::InvalidReference(_) => {
                    "Referenced record does not exist".to_owned()
                }
                RepositoryError::Database(_) => "Internal server error".to_owned(),
            },
            Self::PayloadTooLarge => "Request body too large".to_owned(),
            Self::NotFound(msg) | Self::Unauthorized(msg) | Self::BadRequest(msg) => msg.clone(),
        }
    }
}

impl From<InvalidProduct> for AppError {
    fn from(err: InvalidProduct) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        error_response(status, self.message())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the current request.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}
