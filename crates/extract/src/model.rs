use std::fmt::Debug;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::ExtractError;

/// One piece of a multimodal request, in the order it is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text(String),
    /// Binary payload, already base64 encoded.
    InlineData { mime_type: String, data: String },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text(text.into())
    }

    /// Encode raw image bytes as an inline part.
    pub fn inline_image(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Part::InlineData {
            mime_type: mime_type.into(),
            data: STANDARD.encode(bytes),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text(text) => Some(text),
            Part::InlineData { .. } => None,
        }
    }
}

/// A generative model that answers a multimodal prompt with text.
///
/// Implementations must be safe to share between concurrent requests; the
/// gateway holds one behind an `Arc` for the lifetime of the process.
#[async_trait]
pub trait GenerativeModel: Send + Sync + Debug {
    /// Send `parts` as a single user turn and return the reply text.
    async fn generate(&self, parts: &[Part]) -> Result<String, ExtractError>;

    /// Provider label for logs (`"gemini"`, `"fake"`).
    fn provider_name(&self) -> &'static str;

    fn model_name(&self) -> &str;
}
