//! Error types and error handling for the application
//!
//! This module defines the closed set of error kinds the service can surface
//! and their conversion to HTTP responses. All errors implement
//! `IntoResponse` to provide consistent error formatting.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::songinfo::InfoError;

/// Application-level error types
///
/// Storage and lookup failures are re-classified into these kinds at the
/// service boundary; handlers never see raw driver errors. Each variant
/// carries a short user-facing message; SQL text and driver details are
/// logged, not returned.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request failed validation before reaching the domain layer
    #[error("invalid request: {0}")]
    Validation(String),

    /// No song exists with the given id (or verse number, for verse updates)
    #[error("song not found")]
    SongNotFound,

    /// No group exists with the given name
    #[error("group not found")]
    GroupNotFound,

    /// The listing query matched no songs
    #[error("there are no songs matching the request")]
    NoSongs,

    /// A song with this (group, song) pair was already ingested
    #[error("song already exists")]
    AlreadyExists,

    /// The lookup service returned a release date that does not parse
    #[error("wrong release date format")]
    BadDataFormat,

    /// Storage operation exceeded its deadline
    #[error("request timeout exceeded: {0}")]
    Timeout(String),

    /// Error from the external song info lookup
    #[error(transparent)]
    SongInfo(#[from] InfoError),

    /// Storage request failed for a reason the caller cannot act on
    #[error("request execution failed")]
    RequestFailed,

    /// Internal server error (catch-all for unexpected errors)
    #[error("internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::SongNotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::GroupNotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::NoSongs => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::AlreadyExists => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::BadDataFormat => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Timeout(_) => (StatusCode::REQUEST_TIMEOUT, self.to_string()),
            AppError::SongInfo(info) => (info_status(info), self.to_string()),
            AppError::RequestFailed => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

/// Status mapping for lookup errors: empty-input and upstream-rejected
/// requests are the caller's fault; transport failures, upstream 500s, and
/// unparseable bodies are not.
fn info_status(err: &InfoError) -> StatusCode {
    match err {
        InfoError::GroupNameRequired
        | InfoError::SongNameRequired
        | InfoError::ServiceBadRequest => StatusCode::BAD_REQUEST,
        InfoError::ServiceInternal | InfoError::Deserialize | InfoError::ServiceUnknown(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
