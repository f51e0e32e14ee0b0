//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::db::DatabaseError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping. The domain taxonomy maps
/// one-to-one so front-ends can branch on the code string.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
    #[error("No capacity: {0}")]
    NoCapacity(String),
    #[error("Already assigned: {0}")]
    AlreadyAssigned(String),
    #[error("Already read: {0}")]
    AlreadyRead(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail.clone()),
            ApiError::InvalidTransition(detail) => {
                (StatusCode::CONFLICT, "INVALID_TRANSITION", detail.clone())
            }
            ApiError::NoCapacity(detail) => (StatusCode::CONFLICT, "NO_CAPACITY", detail.clone()),
            ApiError::AlreadyAssigned(detail) => {
                (StatusCode::CONFLICT, "ALREADY_ASSIGNED", detail.clone())
            }
            ApiError::AlreadyRead(detail) => {
                (StatusCode::CONFLICT, "ALREADY_READ", detail.clone())
            }
            ApiError::Conflict(detail) => (StatusCode::CONFLICT, "CONFLICT", detail.clone()),
            ApiError::ConstraintViolation(detail) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "CONSTRAINT_VIOLATION",
                detail.clone(),
            ),
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail.clone())
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match &err {
            DatabaseError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            DatabaseError::InvalidTransition(_) => ApiError::InvalidTransition(err.to_string()),
            DatabaseError::NoCapacity { .. } => ApiError::NoCapacity(err.to_string()),
            DatabaseError::AlreadyAssigned { .. } => ApiError::AlreadyAssigned(err.to_string()),
            DatabaseError::AlreadyRead(_) => ApiError::AlreadyRead(err.to_string()),
            DatabaseError::Conflict(_) => ApiError::Conflict(err.to_string()),
            DatabaseError::ConstraintViolation(_) | DatabaseError::InvalidEnum { .. } => {
                ApiError::ConstraintViolation(err.to_string())
            }
            DatabaseError::Sqlite(_) | DatabaseError::MigrationFailed { .. } => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}
