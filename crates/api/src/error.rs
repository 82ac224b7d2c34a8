//! Maps service errors onto HTTP responses.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use library_core::InvalidInput;
use library_core::model::{ParseIdError, ReadingLogError};
use serde_json::json;
use services::{BookServiceError, ReadingSessionError};
use storage::repository::StorageError;
use thiserror::Error;

/// Error returned by every handler; renders as `{"error": {"code", "message"}}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            ApiError::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));
        (status, body).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => ApiError::NotFound(err.to_string()),
            StorageError::Conflict => ApiError::Conflict(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<BookServiceError> for ApiError {
    fn from(err: BookServiceError) -> Self {
        match err {
            BookServiceError::NotFound => ApiError::NotFound(err.to_string()),
            BookServiceError::IsbnExists | BookServiceError::HasReadingEntries => {
                ApiError::Conflict(err.to_string())
            }
            BookServiceError::Book(e) => ApiError::BadRequest(e.to_string()),
            BookServiceError::Storage(e) => e.into(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ReadingSessionError> for ApiError {
    fn from(err: ReadingSessionError) -> Self {
        match err {
            ReadingSessionError::BookNotFound | ReadingSessionError::SessionNotFound => {
                ApiError::NotFound(err.to_string())
            }
            ReadingSessionError::SessionExists => ApiError::Conflict(err.to_string()),
            ReadingSessionError::Log(e) => e.into(),
            ReadingSessionError::Storage(e) => e.into(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ReadingLogError> for ApiError {
    fn from(err: ReadingLogError) -> Self {
        match err {
            ReadingLogError::DuplicateDate(_) => ApiError::Conflict(err.to_string()),
            ReadingLogError::EntryNotFound(_) => ApiError::NotFound(err.to_string()),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

impl From<InvalidInput> for ApiError {
    fn from(err: InvalidInput) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<ParseIdError> for ApiError {
    fn from(err: ParseIdError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
