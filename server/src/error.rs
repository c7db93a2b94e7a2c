//! HTTP rendering of every failure a handler can produce.
//!
//! # Design
//! All error bodies share one shape, `{"detail": ...}`. A not-found or
//! storage failure carries a string; validation failures carry a list of
//! `{loc, msg, type}` entries so clients can point at the offending field.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use todo_core::TodoError;

/// Errors returned by the route handlers and extractors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Todo(#[from] TodoError),

    /// A path parameter parsed but broke a constraint, or did not parse.
    #[error("{name}: {message}")]
    InvalidPath { name: &'static str, message: String },

    #[error(transparent)]
    Json(#[from] JsonRejection),

    #[error(transparent)]
    Path(#[from] PathRejection),
}

impl ApiError {
    pub fn invalid_path(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidPath {
            name,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Todo(TodoError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Todo(TodoError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Todo(TodoError::Storage(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InvalidPath { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Json(rejection) => rejection.status(),
            ApiError::Path(rejection) => rejection.status(),
        }
    }

    fn detail(&self) -> Value {
        match self {
            ApiError::Todo(err @ TodoError::NotFound(_)) => json!(err.to_string()),
            ApiError::Todo(TodoError::Validation(field)) => json!([{
                "loc": ["body", field.field],
                "msg": field.message,
                "type": "value_error",
            }]),
            ApiError::Todo(TodoError::Storage(_)) => json!("Internal Server Error"),
            ApiError::InvalidPath { name, message } => json!([{
                "loc": ["path", name],
                "msg": message,
                "type": "value_error",
            }]),
            ApiError::Json(rejection) => json!([{
                "loc": ["body"],
                "msg": rejection.body_text(),
                "type": "json_invalid",
            }]),
            ApiError::Path(rejection) => json!(rejection.body_text()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }
        (status, Json(json!({ "detail": self.detail() }))).into_response()
    }
}
