//! Error types produced by the ingest crate.
//!
//! Every variant is a client-side validation failure. The `Display` text is
//! the exact reason returned to API callers, so changing a message here is a
//! wire-visible change.
//!
//! # HTTP Status Code Mapping
//!
//! ```rust
//! use ingest::IngestError;
//!
//! let err = IngestError::MissingExtension;
//! assert_eq!(err.http_status_code(), 400);
//! assert_eq!(err.to_string(), "File has no extension");
//! ```
use thiserror::Error;

/// Reasons an uploaded file is rejected before it reaches the model.
///
/// Variants are checked in declaration order by
/// [`validate_upload`](crate::validate_upload); the first failing check wins.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IngestError {
    /// No file reference was supplied at all.
    #[error("No file provided")]
    NoFileProvided,

    /// A file part exists but its filename is empty.
    #[error("No file selected")]
    NoFileSelected,

    /// The filename contains no `.`.
    #[error("File has no extension")]
    MissingExtension,

    /// The lowercased extension is outside the allow-set.
    ///
    /// `allowed` is the comma-separated allow-set in configuration order.
    #[error("Invalid file type. Allowed: {allowed}")]
    UnsupportedExtension { extension: String, allowed: String },

    /// The leading bytes do not carry a PNG, JPEG or GIF signature.
    #[error("File is not a valid image")]
    NotAnImage,
}

impl IngestError {
    /// Returns true if this error indicates a client-side issue.
    ///
    /// All ingest errors are caused by the uploaded content, so this always
    /// returns true. It mirrors the helper on the extract error type so the
    /// server can treat both uniformly.
    pub fn is_client_error(&self) -> bool {
        true
    }

    /// Suggested HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        400
    }
}
