use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ExtractError, GeminiConfig, GenerativeModel, Part};

/// Upper bound on how much of an error body ends up in an error message.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// [`GenerativeModel`] backed by the Gemini REST API.
///
/// Holds one pooled `reqwest::Client`. Share it behind an `Arc`.
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Build a client from validated configuration.
    pub fn new(config: &GeminiConfig) -> Result<Self, ExtractError> {
        config.validate()?;

        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .pool_max_idle_per_host(8);
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| ExtractError::NotConfigured(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: config.endpoint(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(&self, parts: &[Part]) -> Result<String, ExtractError> {
        let body = GenerateContentRequest::from_parts(parts);

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ExtractError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = match response.text().await {
                Ok(text) => text,
                Err(err) => {
                    debug!(status = status.as_u16(), error = %err, "gemini_error_body_unreadable");
                    String::new()
                }
            };
            return Err(ExtractError::Api {
                status: status.as_u16(),
                message: api_error_message(status, &text),
            });
        }

        let reply: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ExtractError::Request(format!("invalid response body: {e}")))?;

        debug!(
            model = %self.model,
            candidates = reply.candidates.len(),
            "gemini_reply_received"
        );

        reply.into_text()
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
}

impl<'a> GenerateContentRequest<'a> {
    fn from_parts(parts: &'a [Part]) -> Self {
        Self {
            contents: [Content {
                role: "user",
                parts: parts.iter().map(WirePart::from).collect(),
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<WirePart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WirePart<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<Blob<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Blob<'a> {
    mime_type: &'a str,
    data: &'a str,
}

impl<'a> From<&'a Part> for WirePart<'a> {
    fn from(part: &'a Part) -> Self {
        match part {
            Part::Text(text) => WirePart {
                text: Some(text.as_str()),
                inline_data: None,
            },
            Part::InlineData { mime_type, data } => WirePart {
                text: None,
                inline_data: Some(Blob {
                    mime_type: mime_type.as_str(),
                    data: data.as_str(),
                }),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ReplyPart>,
}

#[derive(Debug, Deserialize)]
struct ReplyPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate.
    fn into_text(self) -> Result<String, ExtractError> {
        let block_reason = self.prompt_feedback.and_then(|f| f.block_reason);

        let Some(candidate) = self.candidates.into_iter().next() else {
            return Err(ExtractError::EmptyReply(
                block_reason.unwrap_or_else(|| "no candidates".into()),
            ));
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ExtractError::EmptyReply(
                candidate
                    .finish_reason
                    .or(block_reason)
                    .unwrap_or_else(|| "empty candidate".into()),
            ));
        }
        Ok(text)
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

/// Upstream message from an error body, or the status reason when the body
/// is empty or unreadable.
fn api_error_message(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) if !parsed.error.message.is_empty() => parsed.error.message,
        _ if body.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("no error body")
            .to_string(),
        _ => body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
    }
}
