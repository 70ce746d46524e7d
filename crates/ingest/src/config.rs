//! Configuration for upload validation.
//!
//! [`IngestConfig`] carries the extension allow-set and the number of leading
//! bytes inspected by the signature sniffer. It is cheap to clone and
//! deserializes from the same JSON/TOML/YAML sources as the server config.
//!
//! ```rust
//! use ingest::IngestConfig;
//!
//! let config = IngestConfig::default();
//! config.validate().expect("default config is valid");
//! assert!(config.is_allowed_extension("jpeg"));
//! ```
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of leading bytes handed to the signature sniffer.
pub const DEFAULT_SNIFF_BYTES: usize = 512;

/// Runtime configuration for upload validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Lowercase extensions accepted before signature sniffing.
    ///
    /// Order matters only for the "Allowed: ..." rejection message.
    pub allowed_extensions: Vec<String>,

    /// How many leading bytes the signature check looks at.
    pub sniff_bytes: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: ["png", "jpg", "jpeg", "gif", "heic"]
                .into_iter()
                .map(String::from)
                .collect(),
            sniff_bytes: DEFAULT_SNIFF_BYTES,
        }
    }
}

impl IngestConfig {
    /// Whether `extension` (already lowercased) is in the allow-set.
    pub fn is_allowed_extension(&self, extension: &str) -> bool {
        self.allowed_extensions.iter().any(|ext| ext == extension)
    }

    /// The allow-set rendered for error messages: `png, jpg, ...`.
    pub fn allowed_list(&self) -> String {
        self.allowed_extensions.join(", ")
    }

    /// Validates internal consistency of this configuration.
    ///
    /// Call once at start-up; it performs only in-memory checks.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.allowed_extensions.is_empty() {
            return Err(ConfigError::EmptyAllowList);
        }

        if let Some(ext) = self
            .allowed_extensions
            .iter()
            .find(|ext| ext.is_empty() || ext.contains('.') || **ext != ext.to_ascii_lowercase())
        {
            return Err(ConfigError::InvalidExtension(ext.clone()));
        }

        // The PNG signature is eight bytes long.
        if self.sniff_bytes < 8 {
            return Err(ConfigError::SniffWindowTooSmall(self.sniff_bytes));
        }

        Ok(())
    }
}

/// Configuration validation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("allowed_extensions must not be empty")]
    EmptyAllowList,

    #[error("allowed extension '{0}' must be lowercase, non-empty and without a dot")]
    InvalidExtension(String),

    #[error("sniff_bytes must be at least 8, got {0}")]
    SniffWindowTooSmall(usize),
}
