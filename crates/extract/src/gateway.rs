use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::{
    extract_json_body, ExtractError, ExtractionSource, GenerativeModel, Part,
    PrescriptionExtraction,
};

/// How much of the raw reply is written to debug logs.
const LOGGED_REPLY_CHARS: usize = 200;

/// Turns prescription payloads into [`PrescriptionExtraction`]s through a
/// [`GenerativeModel`].
///
/// The gateway owns no per-request state and is shared across handlers.
#[derive(Debug, Clone)]
pub struct PrescriptionGateway {
    model: Arc<dyn GenerativeModel>,
}

impl PrescriptionGateway {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &dyn GenerativeModel {
        self.model.as_ref()
    }

    /// Extract medications from a validated image.
    pub async fn extract_from_image(
        &self,
        bytes: &[u8],
        mime_type: &str,
    ) -> Result<PrescriptionExtraction, ExtractError> {
        let parts = [
            Part::text(ExtractionSource::Image.template()),
            Part::inline_image(mime_type, bytes),
        ];
        self.run(ExtractionSource::Image, &parts).await
    }

    /// Extract medications from a free-text description.
    ///
    /// Blank text is rejected without calling the model.
    pub async fn extract_from_text(
        &self,
        text: &str,
    ) -> Result<PrescriptionExtraction, ExtractError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ExtractError::Validation("Text is required".into()));
        }

        let parts = [
            Part::text(ExtractionSource::Text.template()),
            Part::text(text),
        ];
        self.run(ExtractionSource::Text, &parts).await
    }

    async fn run(
        &self,
        source: ExtractionSource,
        parts: &[Part],
    ) -> Result<PrescriptionExtraction, ExtractError> {
        let start = Instant::now();

        let result = match self.model.generate(parts).await {
            Ok(reply) => {
                debug!(
                    prompt = source.as_str(),
                    reply = %truncate_chars(&reply, LOGGED_REPLY_CHARS),
                    "model_reply"
                );
                parse_extraction(&reply, source)
            }
            Err(err) => Err(err),
        };

        match &result {
            Ok(extraction) => {
                let incomplete = extraction.incomplete_count();
                if incomplete > 0 {
                    warn!(
                        prompt = source.as_str(),
                        incomplete,
                        "incomplete_medication_records"
                    );
                }
                info!(
                    prompt = source.as_str(),
                    provider = self.model.provider_name(),
                    model = self.model.model_name(),
                    medication_count = extraction.medications.len(),
                    elapsed_micros = start.elapsed().as_micros(),
                    "extract_success"
                );
            }
            Err(err) if err.is_client_error() => {
                warn!(
                    prompt = source.as_str(),
                    kind = err.kind(),
                    error = %err,
                    elapsed_micros = start.elapsed().as_micros(),
                    "extract_failure"
                );
            }
            Err(err) => {
                error!(
                    prompt = source.as_str(),
                    provider = self.model.provider_name(),
                    kind = err.kind(),
                    error = %err,
                    elapsed_micros = start.elapsed().as_micros(),
                    "extract_failure"
                );
            }
        }

        result
    }
}

/// Decode a raw model reply into a [`PrescriptionExtraction`].
///
/// Checks run in order: fence stripping, JSON syntax, top-level object,
/// presence of at least one medication, then the typed decode.
pub fn parse_extraction(
    reply: &str,
    source: ExtractionSource,
) -> Result<PrescriptionExtraction, ExtractError> {
    let body = extract_json_body(reply);
    let value: Value =
        serde_json::from_str(body).map_err(|e| ExtractError::Parse(e.to_string()))?;

    let Value::Object(map) = &value else {
        return Err(ExtractError::Parse(
            "expected a JSON object at the top level".into(),
        ));
    };

    match map.get("medications") {
        None | Some(Value::Null) => return Err(empty_result(source)),
        Some(Value::Array(items)) if items.is_empty() => return Err(empty_result(source)),
        Some(Value::Array(_)) => {}
        Some(_) => {
            return Err(ExtractError::Parse("`medications` must be an array".into()));
        }
    }

    serde_json::from_value(value).map_err(|e| ExtractError::Parse(e.to_string()))
}

fn empty_result(source: ExtractionSource) -> ExtractError {
    ExtractError::EmptyResult(format!("No medications found in the {}", source.as_str()))
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
