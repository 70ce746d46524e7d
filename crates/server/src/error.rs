use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use extract::ExtractError;
use ingest::IngestError;
use sehatyaad::PipelineError;

use crate::envelope::ResponseEnvelope;

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
///
/// `Display` is the exact `error` string placed in the response envelope.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("{0}")]
    BadRequest(String),

    #[error("File too large. Maximum size is {0}MB.")]
    PayloadTooLarge(usize),

    /// Upstream or unexpected failure; carries the caller-facing message
    /// and the detail that only goes to the logs.
    #[error("{message}")]
    Processing {
        message: &'static str,
        detail: String,
    },

    #[error("Not found")]
    NotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Request timed out")]
    Timeout,

    #[error("Internal server error")]
    Internal(String),
}

impl ServerError {
    /// Get HTTP status code for this error
    fn status_code(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ServerError::Timeout => StatusCode::REQUEST_TIMEOUT,
            ServerError::Processing { .. } | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ServerError::BadRequest(_) => "BAD_REQUEST",
            ServerError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ServerError::Processing { .. } => "PROCESSING_ERROR",
            ServerError::NotFound => "NOT_FOUND",
            ServerError::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            ServerError::Timeout => "TIMEOUT",
            ServerError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Map a gateway failure: client-class errors keep their message,
    /// everything else is replaced by `generic`.
    pub fn from_extract(err: ExtractError, generic: &'static str) -> Self {
        if err.is_client_error() {
            ServerError::BadRequest(err.to_string())
        } else {
            ServerError::Processing {
                message: generic,
                detail: err.to_string(),
            }
        }
    }

    /// Same mapping for the full upload pipeline.
    pub fn from_pipeline(err: PipelineError, generic: &'static str) -> Self {
        match err {
            PipelineError::Ingest(err) => err.into(),
            PipelineError::Extract(err) => Self::from_extract(err, generic),
        }
    }
}

impl From<IngestError> for ServerError {
    fn from(err: IngestError) -> Self {
        ServerError::BadRequest(err.to_string())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            ServerError::Processing { detail, .. } => {
                tracing::error!(code = self.error_code(), detail = %detail, "request_failed");
            }
            ServerError::Internal(detail) => {
                tracing::error!(code = self.error_code(), detail = %detail, "request_failed");
            }
            _ => {
                tracing::debug!(code = self.error_code(), error = %self, "request_rejected");
            }
        }

        (status, Json(ResponseEnvelope::<()>::failure(self.to_string()))).into_response()
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::Internal(format!("IO error: {err}"))
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        ServerError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENERIC: &str = "Failed to process prescription text. Please try again.";

    #[test]
    fn client_extract_errors_keep_message() {
        let err = ServerError::from_extract(
            ExtractError::EmptyResult("No medications found in the text".into()),
            GENERIC,
        );
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "No medications found in the text");
    }

    #[test]
    fn upstream_errors_are_generic() {
        let err = ServerError::from_extract(
            ExtractError::Api {
                status: 401,
                message: "API key not valid".into(),
            },
            GENERIC,
        );
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), GENERIC);
        assert!(!err.to_string().contains("API key"));
    }

    #[test]
    fn ingest_errors_are_bad_requests() {
        let err = ServerError::from_pipeline(PipelineError::Ingest(IngestError::NotAnImage), GENERIC);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "File is not a valid image");
    }

    #[test]
    fn internal_detail_is_hidden() {
        let err = ServerError::Internal("db exploded".into());
        assert_eq!(err.to_string(), "Internal server error");
        assert_eq!(
            ServerError::PayloadTooLarge(16).to_string(),
            "File too large. Maximum size is 16MB."
        );
    }
}
