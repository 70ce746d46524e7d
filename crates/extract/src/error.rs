use thiserror::Error;

/// Errors surfaced by the extraction gateway and model clients.
///
/// The first three variants are caller-facing (400-class): the input was
/// unusable or the model answered with something we cannot use. Everything
/// else is an upstream/processing failure whose detail must stay in the logs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExtractError {
    /// Input rejected before any model call (e.g. blank text).
    #[error("{0}")]
    Validation(String),
    /// The model replied, but the cleaned reply is not the expected JSON.
    #[error("Failed to parse model response: {0}")]
    Parse(String),
    /// The reply parsed but contained no medications.
    #[error("{0}")]
    EmptyResult(String),
    /// Transport-level failure talking to the model.
    #[error("model request failed: {0}")]
    Request(String),
    /// The model API answered with a non-success status.
    #[error("model API error: {status} - {message}")]
    Api { status: u16, message: String },
    /// The model API answered successfully but without any text.
    #[error("model reply contained no text: {0}")]
    EmptyReply(String),
    /// The client could not be constructed from its configuration.
    #[error("model client not configured: {0}")]
    NotConfigured(String),
}

impl ExtractError {
    /// True for failures caused by the input or by an unusable model answer.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ExtractError::Validation(_) | ExtractError::Parse(_) | ExtractError::EmptyResult(_)
        )
    }

    /// Suggested HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        if self.is_client_error() {
            400
        } else {
            500
        }
    }

    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractError::Validation(_) => "validation",
            ExtractError::Parse(_) => "parse",
            ExtractError::EmptyResult(_) => "empty_result",
            ExtractError::Request(_)
            | ExtractError::Api { .. }
            | ExtractError::EmptyReply(_)
            | ExtractError::NotConfigured(_) => "upstream",
        }
    }
}
