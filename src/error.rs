//! Error types for the learning engine
//!
//! Provides unified error handling using thiserror. Cache degradations never
//! appear here: the cache layer absorbs them.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == App Error Enum ==
/// Unified error type for the engine and its HTTP surface.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    /// Malformed or out-of-range input, rejected before any mutation
    #[error("{message}")]
    Validation { code: &'static str, message: String },

    /// Unknown student or exercise
    #[error("{message}")]
    NotFound { code: &'static str, message: String },

    /// Datastore fault; transient faults are retried at the store boundary
    #[error("Datastore error: {message}")]
    Datastore { message: String, transient: bool },

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(code: &'static str, message: impl Into<String>) -> Self {
        AppError::Validation {
            code,
            message: message.into(),
        }
    }

    pub fn student_not_found(student_id: u64) -> Self {
        AppError::NotFound {
            code: "STUDENT_NOT_FOUND",
            message: format!("Student {} not found", student_id),
        }
    }

    pub fn exercise_not_found(exercise_id: &str) -> Self {
        AppError::NotFound {
            code: "EXERCISE_NOT_FOUND",
            message: format!("Exercise '{}' not found", exercise_id),
        }
    }

    /// Machine-checkable error code.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { code, .. } | AppError::NotFound { code, .. } => code,
            AppError::Datastore { .. } => "DATASTORE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the datastore boundary may retry the failed call.
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::Datastore { transient: true, .. })
    }
}

// == Body rejections ==
/// Malformed or mistyped JSON bodies become coded validation errors.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::validation("INVALID_BODY", rejection.body_text())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Datastore {
                transient: true, ..
            } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Datastore { .. } | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string(),
            "code": self.code(),
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the engine.
pub type Result<T> = std::result::Result<T, AppError>;
