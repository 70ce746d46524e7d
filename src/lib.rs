//! Workspace umbrella crate for the SehatYaad prescription backend.
//!
//! This crate stitches upload validation and model extraction together so
//! callers (the HTTP server, scripts, tests) can go from a raw upload or a
//! text description to a [`PrescriptionExtraction`] with one call.

pub use extract::{
    Confidence, ExtractError, ExtractionSource, FakeModel, GeminiClient, GeminiConfig,
    GenerativeModel, MedicationRecord, Part, PrescriptionExtraction, PrescriptionGateway,
    extract_json_body, parse_extraction,
};
pub use ingest::{
    ImageKind, IngestConfig, IngestError, UploadedImage, ValidatedImage, ingest_upload, mime_type,
};

use std::error::Error;
use std::fmt;

/// Errors that can occur while taking a prescription through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    Ingest(IngestError),
    Extract(ExtractError),
}

impl PipelineError {
    /// True when the caller, not the service or the model provider, is at fault.
    pub fn is_client_error(&self) -> bool {
        match self {
            PipelineError::Ingest(err) => err.is_client_error(),
            PipelineError::Extract(err) => err.is_client_error(),
        }
    }

    pub fn http_status_code(&self) -> u16 {
        match self {
            PipelineError::Ingest(err) => err.http_status_code(),
            PipelineError::Extract(err) => err.http_status_code(),
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Upload rejections are shown to callers verbatim.
            PipelineError::Ingest(err) => write!(f, "{err}"),
            PipelineError::Extract(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PipelineError::Ingest(err) => Some(err),
            PipelineError::Extract(err) => Some(err),
        }
    }
}

impl From<IngestError> for PipelineError {
    fn from(value: IngestError) -> Self {
        PipelineError::Ingest(value)
    }
}

impl From<ExtractError> for PipelineError {
    fn from(value: ExtractError) -> Self {
        PipelineError::Extract(value)
    }
}

/// Validate an uploaded prescription image and extract its medications.
///
/// The upload is checked (presence, filename, extension, signature) before
/// any model call; a rejected upload never reaches the gateway.
pub async fn process_upload(
    gateway: &PrescriptionGateway,
    upload: Option<UploadedImage>,
    cfg: &IngestConfig,
) -> Result<PrescriptionExtraction, PipelineError> {
    let image = ingest_upload(upload, cfg)?;
    let extraction = gateway
        .extract_from_image(&image.content, image.mime_type)
        .await?;
    Ok(extraction)
}

/// Extract medications from a patient's free-text description.
pub async fn process_description(
    gateway: &PrescriptionGateway,
    text: &str,
) -> Result<PrescriptionExtraction, PipelineError> {
    Ok(gateway.extract_from_text(text).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn gateway_replying(reply: &str) -> (PrescriptionGateway, Arc<FakeModel>) {
        let model = Arc::new(FakeModel::replying(reply));
        (PrescriptionGateway::new(model.clone()), model)
    }

    #[tokio::test]
    async fn rejected_upload_skips_model() {
        let (gateway, model) = gateway_replying(r#"{"medications": []}"#);

        let upload = UploadedImage::new("notes.txt", b"hello".to_vec());
        let err = process_upload(&gateway, Some(upload), &IngestConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Ingest(_)));
        assert!(err.is_client_error());
        assert_eq!(
            err.to_string(),
            "Invalid file type. Allowed: png, jpg, jpeg, gif, heic"
        );
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn blank_description_is_validation_error() {
        let (gateway, model) = gateway_replying(r#"{"medications": []}"#);

        let err = process_description(&gateway, "  ").await.unwrap_err();
        assert_eq!(
            err,
            PipelineError::Extract(ExtractError::Validation("Text is required".into()))
        );
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(model.call_count(), 0);
    }

    #[test]
    fn upstream_errors_are_server_side() {
        let err = PipelineError::from(ExtractError::Request("timeout".into()));
        assert!(!err.is_client_error());
        assert_eq!(err.http_status_code(), 500);
        assert!(err.source().is_some());
    }
}
