//! Application Error Types
//!
//! Centralized error handling with Axum integration.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::infrastructure::events::EventError;
use crate::infrastructure::repositories::RepositoryError;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        errors: Vec<FieldError>,
    },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            errors: Vec::new(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

/// Field-level validation error
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => AppError::NotFound("Record not found".into()),
            RepositoryError::Database(e) => AppError::Database(e),
            e if e.is_validation() => AppError::validation(e.to_string()),
            e => AppError::Internal(e.to_string()),
        }
    }
}

impl From<EventError> for AppError {
    fn from(err: EventError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message, errors) = match self {
            AppError::NotFound(msg) => (10001, msg, None),
            AppError::BadRequest(msg) => (10002, msg, None),
            AppError::Conflict(msg) => (10005, msg, None),
            AppError::Validation { message, errors } => {
                (10007, message, (!errors.is_empty()).then_some(errors))
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (10000, "Internal server error".into(), None)
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (10000, "Internal server error".into(), None)
            }
        };

        let body = ErrorResponse {
            code,
            message,
            errors,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(RepositoryError::NotFound, StatusCode::NOT_FOUND ; "not found")]
    #[test_case(RepositoryError::validation("nil tenant"), StatusCode::BAD_REQUEST ; "validation")]
    #[test_case(RepositoryError::MissingWhereClause("delete"), StatusCode::BAD_REQUEST ; "missing where")]
    #[test_case(RepositoryError::ReadOnly, StatusCode::BAD_REQUEST ; "read only")]
    #[test_case(RepositoryError::Finished, StatusCode::INTERNAL_SERVER_ERROR ; "finished")]
    #[test_case(RepositoryError::Database(sqlx::Error::RowNotFound), StatusCode::INTERNAL_SERVER_ERROR ; "database")]
    fn test_repository_error_status(err: RepositoryError, expected: StatusCode) {
        let response = AppError::from(err).into_response();
        assert_eq!(response.status(), expected);
    }

    #[test]
    fn test_event_error_is_internal() {
        let err = AppError::from(EventError::QueueFull);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
