//! Error types for the PDF toolkit server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pdfkit_core::PdfKitError;
use serde::Serialize;
use thiserror::Error;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Session expired")]
    SessionExpired,

    #[error("No processed output available")]
    OutputNotReady,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Toolkit(#[from] PdfKitError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ServerError::SessionNotFound(_) => (StatusCode::NOT_FOUND, "SESSION_NOT_FOUND"),
            ServerError::SessionExpired => (StatusCode::GONE, "SESSION_EXPIRED"),
            ServerError::OutputNotReady => (StatusCode::NOT_FOUND, "OUTPUT_NOT_READY"),
            ServerError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            ServerError::Toolkit(err) => toolkit_status(err),
            ServerError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Map a core failure to an HTTP status and a stable error code.
fn toolkit_status(err: &PdfKitError) -> (StatusCode, &'static str) {
    match err {
        PdfKitError::InvalidFileKind(_) => (StatusCode::BAD_REQUEST, "INVALID_FILE_KIND"),
        PdfKitError::InsufficientInputs(_) => (StatusCode::BAD_REQUEST, "INSUFFICIENT_INPUTS"),
        PdfKitError::IndexOutOfRange { .. } => (StatusCode::BAD_REQUEST, "INDEX_OUT_OF_RANGE"),
        PdfKitError::InvalidRange(_) => (StatusCode::BAD_REQUEST, "INVALID_RANGE"),
        PdfKitError::InvalidChunkSize(_) => (StatusCode::BAD_REQUEST, "INVALID_CHUNK_SIZE"),
        PdfKitError::MissingDocument => (StatusCode::BAD_REQUEST, "MISSING_DOCUMENT"),
        PdfKitError::NoTextAvailable => (StatusCode::BAD_REQUEST, "NO_TEXT_AVAILABLE"),
        PdfKitError::ParseError(_) => (StatusCode::UNPROCESSABLE_ENTITY, "PARSE_ERROR"),
        PdfKitError::OperationError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "OPERATION_ERROR"),
    }
}
