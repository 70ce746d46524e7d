//! SehatYaad ingest layer
//!
//! This is where an uploaded prescription image enters the service. We check
//! that something was uploaded, that its name carries an allowed extension,
//! and that the bytes really start like a PNG, JPEG or GIF. If all of that
//! holds we attach the MIME type the model call needs and hand back a
//! [`ValidatedImage`].
//!
//! ## Main entry point
//!
//! Call [`ingest_upload`] with an optional [`UploadedImage`] and an
//! [`IngestConfig`]. Errors are typed ([`IngestError`]) and their `Display`
//! text is the reason shown to API callers.
//!
//! ## Example
//!
//! ```
//! use ingest::{ingest_upload, IngestConfig, ImageKind, UploadedImage};
//!
//! let mut png = b"\x89PNG\r\n\x1a\n".to_vec();
//! png.resize(64, 0);
//!
//! let upload = UploadedImage::new("rx.PNG", png);
//! let validated = ingest_upload(Some(upload), &IngestConfig::default()).unwrap();
//!
//! assert_eq!(validated.kind, ImageKind::Png);
//! assert_eq!(validated.mime_type, "image/png");
//! ```
//!
//! Nothing here is stateful; every call is independent.
use std::time::Instant;

use tracing::{info, warn};

mod config;
mod error;
mod mime;
mod types;
mod validate;

pub use crate::config::{ConfigError, IngestConfig, DEFAULT_SNIFF_BYTES};
pub use crate::error::IngestError;
pub use crate::mime::{mime_type, FALLBACK_MIME_TYPE};
pub use crate::types::{ImageKind, UploadedImage, ValidatedImage};
pub use crate::validate::{sniff_image_kind, validate_upload};

/// Validate an upload and resolve its MIME type.
///
/// Emits `ingest_success` at info level or `ingest_failure` at warn level
/// with the rejection reason.
pub fn ingest_upload(
    upload: Option<UploadedImage>,
    cfg: &IngestConfig,
) -> Result<ValidatedImage, IngestError> {
    let start = Instant::now();

    match validate_upload(upload.as_ref(), cfg) {
        Ok(kind) => {
            // validate_upload only succeeds when an upload is present
            let UploadedImage { filename, content } = upload.ok_or(IngestError::NoFileProvided)?;
            let mime_type = mime_type(&filename);

            info!(
                filename = %filename,
                mime_type,
                detected = %kind,
                size_bytes = content.len(),
                elapsed_micros = start.elapsed().as_micros(),
                "ingest_success"
            );

            Ok(ValidatedImage {
                filename,
                content,
                mime_type,
                kind,
            })
        }
        Err(err) => {
            warn!(
                filename = ?upload.as_ref().map(|u| u.filename.as_str()),
                error = %err,
                elapsed_micros = start.elapsed().as_micros(),
                "ingest_failure"
            );
            Err(err)
        }
    }
}
