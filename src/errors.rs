use crate::services::report_service::ReportError;
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// HTTP-facing error: a status, a message and, for validation failures,
/// every violated field.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
    pub details: Vec<String>,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, kind: &'static str, msg: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: msg.into(),
            details: Vec::new(),
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal", msg)
    }

    /// Shortcut for 401 when no caller identity accompanies the request.
    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthenticated", msg)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "error": self.message,
            "kind": self.kind,
            "status": self.status.as_u16()
        });
        if !self.details.is_empty() {
            body["details"] = json!(self.details);
        }

        (self.status, Json(body)).into_response()
    }
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        let message = err.to_string();
        match err {
            ReportError::InvalidPayload(_) => {
                AppError::new(StatusCode::BAD_REQUEST, "InvalidPayload", message)
            }
            ReportError::Validation(details) => AppError {
                details,
                ..AppError::new(StatusCode::BAD_REQUEST, "ValidationError", message)
            },
            ReportError::NotFound(_) => AppError::new(StatusCode::NOT_FOUND, "NotFound", message),
            ReportError::NotAuthorized(_) => {
                AppError::new(StatusCode::FORBIDDEN, "NotAuthorized", message)
            }
            ReportError::Store(store_err) => {
                tracing::error!("report store failure: {}", store_err);
                AppError::internal("internal storage error")
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::new(
            StatusCode::BAD_REQUEST,
            "InvalidPayload",
            rejection.body_text(),
        )
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::internal(err.to_string())
    }
}
