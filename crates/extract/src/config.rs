use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ExtractError;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Connection settings for the Gemini `generateContent` endpoint.
///
/// # Example
/// ```
/// use extract::GeminiConfig;
///
/// let cfg = GeminiConfig {
///     api_key: "test-key".into(),
///     ..Default::default()
/// };
/// assert!(cfg.validate().is_ok());
/// assert_eq!(cfg.model, "gemini-2.5-pro");
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// Secret API key. Never logged or serialized.
    #[serde(skip_serializing)]
    pub api_key: String,
    pub model: String,
    /// Base URL up to and including the API version segment.
    pub api_base: String,
    /// Overall request timeout. With `None` only the server's request
    /// timeout applies.
    pub request_timeout_secs: Option<u64>,
    pub connect_timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_GEMINI_MODEL.into(),
            api_base: DEFAULT_GEMINI_API_BASE.into(),
            request_timeout_secs: None,
            connect_timeout_secs: 10,
        }
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = if self.api_key.is_empty() {
            "<unset>"
        } else {
            "<redacted>"
        };
        f.debug_struct("GeminiConfig")
            .field("api_key", &key)
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

impl GeminiConfig {
    /// Full `generateContent` URL for the configured model.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }

    pub fn validate(&self) -> Result<(), ExtractError> {
        if self.api_key.trim().is_empty() {
            return Err(ExtractError::NotConfigured(
                "GEMINI_API_KEY is required".into(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(ExtractError::NotConfigured("model name is empty".into()));
        }
        if !(self.api_base.starts_with("https://") || self.api_base.starts_with("http://")) {
            return Err(ExtractError::NotConfigured(format!(
                "api_base must be an http(s) URL, got '{}'",
                self.api_base
            )));
        }
        Ok(())
    }
}
