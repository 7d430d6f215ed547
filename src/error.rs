//! Error types shared across the service.
//!
//! - [`StoreError`] - faults raised by a [`crate::domain::repositories::UrlStore`]
//! - [`ServiceError`] - outcome of a shorten/resolve job, delivered as a reply value
//! - [`AppError`] - HTTP-facing error rendered as a JSON body

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

/// Storage collaborator fault.
///
/// Never used to signal a missing record; lookups return `Ok(None)` for that.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        Self::Unavailable(e.to_string())
    }
}

/// Failure of a shorten or resolve request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// Unknown or expired short code.
    #[error("short code not found")]
    NotFound,

    /// Every salted attempt collided with an existing code.
    #[error("failed to generate a unique short code after {attempts} attempts")]
    GenerationExhausted { attempts: usize },

    /// No reply arrived before the request deadline.
    #[error("timed out waiting for a worker")]
    Timeout,

    /// Admission denied by the per-client rate limiter.
    #[error("too many requests")]
    RateLimited,

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// The worker pool is stopping or stopped.
    #[error("worker pool is shutting down")]
    ShuttingDown,

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Short label used for metrics and structured logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::GenerationExhausted { .. } => "generation_exhausted",
            Self::Timeout => "timeout",
            Self::RateLimited => "rate_limited",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::ShuttingDown => "shutting_down",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable(reason) => Self::StoreUnavailable(reason),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Error payload embedded in every error response.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, details: Value },
    #[error("{message}")]
    NotFound { message: String, details: Value },
    #[error("{message}")]
    TooManyRequests { message: String, details: Value },
    #[error("{message}")]
    Unavailable { message: String, details: Value },
    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn too_many_requests(message: impl Into<String>, details: Value) -> Self {
        Self::TooManyRequests {
            message: message.into(),
            details,
        }
    }
    pub fn unavailable(message: impl Into<String>, details: Value) -> Self {
        Self::Unavailable {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation { .. } => (StatusCode::BAD_REQUEST, "validation_error"),
            AppError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            AppError::TooManyRequests { .. } => (StatusCode::TOO_MANY_REQUESTS, "rate_limited"),
            AppError::Unavailable { .. } => (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
            AppError::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.parts().0
    }

    pub fn to_error_info(&self) -> ErrorInfo {
        let (_, code) = self.parts();
        let (message, details) = match self {
            AppError::Validation { message, details }
            | AppError::NotFound { message, details }
            | AppError::TooManyRequests { message, details }
            | AppError::Unavailable { message, details }
            | AppError::Internal { message, details } => (message.clone(), details.clone()),
        };
        ErrorInfo {
            code,
            message,
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::NotFound => AppError::not_found("Short link not found", json!({})),
            ServiceError::GenerationExhausted { attempts } => AppError::internal(
                "Failed to generate a unique short code",
                json!({ "attempts": attempts }),
            ),
            ServiceError::Timeout => {
                AppError::internal("Timed out waiting for a worker", json!({}))
            }
            ServiceError::RateLimited => AppError::too_many_requests("Too many requests", json!({})),
            ServiceError::StoreUnavailable(_) => {
                AppError::unavailable("Storage is unavailable", json!({}))
            }
            ServiceError::ShuttingDown => {
                AppError::unavailable("Service is shutting down", json!({}))
            }
            ServiceError::Internal(_) => AppError::internal("Internal server error", json!({})),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        let details = serde_json::to_value(e.field_errors()).unwrap_or(Value::Null);
        AppError::bad_request("Invalid request payload", details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_status_mapping() {
        let cases = [
            (ServiceError::NotFound, StatusCode::NOT_FOUND),
            (
                ServiceError::GenerationExhausted { attempts: 5 },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (ServiceError::Timeout, StatusCode::INTERNAL_SERVER_ERROR),
            (ServiceError::RateLimited, StatusCode::TOO_MANY_REQUESTS),
            (
                ServiceError::StoreUnavailable("down".to_string()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (ServiceError::ShuttingDown, StatusCode::SERVICE_UNAVAILABLE),
            (
                ServiceError::Internal("boom".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(AppError::from(error.clone()).status(), status, "{error:?}");
        }
    }

    #[test]
    fn test_store_error_becomes_store_unavailable() {
        let err: ServiceError = StoreError::Unavailable("connection refused".to_string()).into();
        assert_eq!(
            err,
            ServiceError::StoreUnavailable("connection refused".to_string())
        );
        assert_eq!(err.label(), "store_unavailable");
    }

    #[test]
    fn test_internal_details_are_not_leaked() {
        let err = AppError::from(ServiceError::StoreUnavailable(
            "password authentication failed".to_string(),
        ));
        let info = err.to_error_info();
        assert_eq!(info.code, "unavailable");
        assert!(!info.message.contains("password"));
    }

    #[test]
    fn test_generation_exhausted_reports_attempts() {
        let info = AppError::from(ServiceError::GenerationExhausted { attempts: 5 }).to_error_info();
        assert_eq!(info.code, "internal_error");
        assert_eq!(info.details["attempts"], 5);
    }
}
