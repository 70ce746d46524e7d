//! Prescription extraction endpoints.
//!
//! Both handlers answer with the `{success, data|error}` envelope. Client
//! mistakes and unusable model answers are 400s carrying their own message;
//! anything upstream is a 500 with a fixed, non-leaking message.

use crate::envelope::ResponseEnvelope;
use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::body::Bytes;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::BytesRejection;
use axum::extract::{Multipart, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use extract::PrescriptionExtraction;
use ingest::UploadedImage;
use std::sync::Arc;
use std::time::Instant;

pub const IMAGE_FIELD: &str = "image";

const NO_IMAGE: &str = "No image file provided";
const TEXT_REQUIRED: &str = "Text is required";
const NOT_JSON: &str = r#"Request must be JSON with a "text" field"#;
const IMAGE_FAILURE: &str = "Failed to process prescription image. Please try again.";
const TEXT_FAILURE: &str = "Failed to process prescription text. Please try again.";

type ExtractionResponse = Json<ResponseEnvelope<PrescriptionExtraction>>;

/// Process a prescription image (POST /api/process-medication-image)
///
/// Expects `multipart/form-data` with a file part named `image`.
pub async fn process_medication_image(
    State(state): State<Arc<ServerState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ServerResult<ExtractionResponse> {
    let start = Instant::now();

    let result: ServerResult<PrescriptionExtraction> = async {
        let Ok(multipart) = multipart else {
            return Err(ServerError::BadRequest(NO_IMAGE.into()));
        };
        let upload = read_image_field(multipart, state.config.max_body_size_mb).await?;

        tracing::info!(
            filename = %upload.filename,
            size_bytes = upload.content.len(),
            "image_request_received"
        );

        sehatyaad::process_upload(&state.gateway, Some(upload), &state.config.ingest)
            .await
            .map_err(|err| ServerError::from_pipeline(err, IMAGE_FAILURE))
    }
    .await;

    record_outcome("image", &result, start);
    result.map(|extraction| Json(ResponseEnvelope::success(extraction)))
}

/// Process a free-text prescription description (POST /api/process-medication-text)
///
/// Expects `application/json` with a string `text` field.
pub async fn process_medication_text(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> ServerResult<ExtractionResponse> {
    let start = Instant::now();

    let result: ServerResult<PrescriptionExtraction> = async {
        if !is_json_content_type(&headers) {
            return Err(ServerError::BadRequest(NOT_JSON.into()));
        }
        let body = body.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ServerError::PayloadTooLarge(state.config.max_body_size_mb)
            } else {
                ServerError::BadRequest(TEXT_REQUIRED.into())
            }
        })?;
        let text =
            text_field(&body).ok_or_else(|| ServerError::BadRequest(TEXT_REQUIRED.into()))?;

        tracing::info!(chars = text.chars().count(), "text_request_received");

        sehatyaad::process_description(&state.gateway, &text)
            .await
            .map_err(|err| ServerError::from_pipeline(err, TEXT_FAILURE))
    }
    .await;

    record_outcome("text", &result, start);
    result.map(|extraction| Json(ResponseEnvelope::success(extraction)))
}

/// Find the `image` part and read it fully.
async fn read_image_field(
    mut multipart: Multipart,
    max_body_size_mb: usize,
) -> ServerResult<UploadedImage> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_body_size_mb))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        // A plain form value named `image` is not a file.
        let Some(filename) = field.file_name().map(str::to_owned) else {
            return Err(ServerError::BadRequest(NO_IMAGE.into()));
        };
        let content = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, max_body_size_mb))?;
        return Ok(UploadedImage::new(filename, content));
    }

    Err(ServerError::BadRequest(NO_IMAGE.into()))
}

fn multipart_error(err: MultipartError, max_body_size_mb: usize) -> ServerError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServerError::PayloadTooLarge(max_body_size_mb)
    } else {
        tracing::warn!(error = %err.body_text(), "multipart_read_failed");
        ServerError::BadRequest(format!("Failed to read upload: {}", err.body_text()))
    }
}

/// `application/json` or any `+json` media type, parameters ignored.
fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let essence = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

/// Non-blank string `text` from a JSON object body.
fn text_field(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    let text = value.get("text")?.as_str()?;
    (!text.trim().is_empty()).then(|| text.to_string())
}

fn record_outcome<T>(endpoint: &'static str, result: &ServerResult<T>, start: Instant) {
    let outcome = match result {
        Ok(_) => "success",
        Err(ServerError::BadRequest(_)) | Err(ServerError::PayloadTooLarge(_)) => "rejected",
        Err(_) => "error",
    };
    metrics::counter!(
        "prescription_extractions_total",
        "endpoint" => endpoint,
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!("prescription_extraction_seconds", "endpoint" => endpoint)
        .record(start.elapsed().as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(content_type: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_str(content_type).unwrap());
        headers
    }

    #[test]
    fn json_content_types() {
        assert!(is_json_content_type(&headers("application/json")));
        assert!(is_json_content_type(&headers("Application/JSON; charset=utf-8")));
        assert!(is_json_content_type(&headers("application/ld+json")));
        assert!(!is_json_content_type(&headers("text/plain")));
        assert!(!is_json_content_type(&HeaderMap::new()));
    }

    #[test]
    fn text_field_requires_non_blank_string() {
        assert_eq!(text_field(br#"{"text": "Metformin"}"#), Some("Metformin".into()));
        assert_eq!(text_field(br#"{"text": "   "}"#), None);
        assert_eq!(text_field(br#"{"text": 42}"#), None);
        assert_eq!(text_field(br#"{"note": "x"}"#), None);
        assert_eq!(text_field(b"not json"), None);
        assert_eq!(text_field(br#"["text"]"#), None);
    }
}
