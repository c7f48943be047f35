//! # Error Handling
//!
//! Unified error handling for the call intake API. Every failure in a webhook
//! pipeline is converted into the JSON envelope
//! `{"status":"error","code":...,"message":...,"trace_id":...}`, with the HTTP
//! status chosen by error kind rather than a blanket 500.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::audit_log::AuditLogError;
use crate::payload::DecodeError;
use crate::telemetry;

/// Unified API error response structure
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiError {
    /// HTTP status code for the response
    #[serde(skip)]
    pub http_status: StatusCode,
    /// Always `"error"`; kept for callers that only inspect `status`
    pub status: Box<str>,
    /// Error code for programmatic handling
    pub code: Box<str>,
    /// Human-readable error message
    pub message: Box<str>,
    /// Additional error details (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Box<serde_json::Value>>,
    /// Correlation trace ID for debugging (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<Box<str>>,
}

impl ApiError {
    /// Create a new API error with the given status code and message
    pub fn new<C: Into<String>, M: Into<String>>(status: StatusCode, code: C, message: M) -> Self {
        Self {
            http_status: status,
            status: Box::from("error"),
            code: code.into().into_boxed_str(),
            message: message.into().into_boxed_str(),
            details: None,
            trace_id: Self::current_trace_id(),
        }
    }

    /// Add details to the error
    pub fn with_details<V: Into<serde_json::Value>>(mut self, details: V) -> Self {
        self.details = Some(Box::new(details.into()));
        self
    }

    /// Extract current trace ID from the active request (falls back to a generated correlation ID)
    fn current_trace_id() -> Option<Box<str>> {
        telemetry::current_trace_id()
            .map(|trace_id| trace_id.into_boxed_str())
            .or_else(|| {
                Some(format!("corr-{}", &uuid::Uuid::new_v4().to_string()[..8]).into_boxed_str())
            })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.http_status, axum::Json(self)).into_response()
    }
}

/// Standard error types with predefined status codes
#[derive(Debug, Error)]
pub enum ErrorType {
    #[error("Bad Request")]
    BadRequest,
    #[error("Not Found")]
    NotFound,
    #[error("Payload Too Large")]
    PayloadTooLarge,
    #[error("Service Unavailable")]
    ServiceUnavailable,
}

impl ErrorType {
    /// Get the appropriate HTTP status code for this error type
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorType::BadRequest => StatusCode::BAD_REQUEST,
            ErrorType::NotFound => StatusCode::NOT_FOUND,
            ErrorType::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ErrorType::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get the error code string for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            ErrorType::BadRequest => "BAD_REQUEST",
            ErrorType::NotFound => "NOT_FOUND",
            ErrorType::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ErrorType::ServiceUnavailable => "SERVICE_UNAVAILABLE",
        }
    }
}

impl From<ErrorType> for ApiError {
    fn from(error_type: ErrorType) -> Self {
        Self::new(
            error_type.status_code(),
            error_type.error_code(),
            error_type.to_string(),
        )
    }
}

/// Failures of the call intake pipeline.
///
/// Client mistakes (`Decode`, `MissingField`) map to 400; everything on the
/// server side maps to 5xx.
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("{provider} payload missing required field: {field}")]
    MissingField {
        provider: &'static str,
        field: &'static str,
    },
    #[error("failed to write audit log: {0}")]
    AuditLog(#[from] AuditLogError),
    #[error("call log storage failed: {0}")]
    Storage(#[from] sea_orm::DbErr),
}

impl IntakeError {
    /// Short label used for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            IntakeError::Decode(_) => "invalid_payload",
            IntakeError::MissingField { .. } => "missing_field",
            IntakeError::AuditLog(_) => "audit_log",
            IntakeError::Storage(err) if is_unavailable(err) => "storage_unavailable",
            IntakeError::Storage(_) => "storage",
        }
    }

    /// Whether the caller, not the service, is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            IntakeError::Decode(_) | IntakeError::MissingField { .. }
        )
    }
}

/// Connection refused, pool exhausted or pool closed.
fn is_unavailable(err: &sea_orm::DbErr) -> bool {
    matches!(
        err,
        sea_orm::DbErr::Conn(_) | sea_orm::DbErr::ConnectionAcquire(_)
    )
}

/// Logging happens where the pipeline fails (`intake::ingest`), not here.
impl From<IntakeError> for ApiError {
    fn from(error: IntakeError) -> Self {
        match error {
            IntakeError::Decode(err) => {
                ApiError::new(StatusCode::BAD_REQUEST, "INVALID_PAYLOAD", err.to_string())
            }
            IntakeError::MissingField { field, .. } => ApiError::new(
                StatusCode::BAD_REQUEST,
                "VALIDATION_FAILED",
                format!("missing required field: {}", field),
            )
            .with_details(serde_json::json!({ "field": field })),
            IntakeError::AuditLog(_) => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "AUDIT_LOG_FAILED",
                "Failed to record webhook audit entry",
            ),
            IntakeError::Storage(err) if is_unavailable(&err) => ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                "Database service unavailable",
            ),
            IntakeError::Storage(_) => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
                "Failed to store call log",
            ),
        }
    }
}
