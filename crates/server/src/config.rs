use extract::GeminiConfig;
use ingest::IngestConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Plain environment variable honoured when no key is configured otherwise.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Deployment label reported in logs (`development`, `production`, ...)
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Request timeout in seconds. Model calls on large images are slow.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum request body size in MB
    #[serde(default = "default_max_body_size_mb")]
    pub max_body_size_mb: usize,

    /// CORS origins for `/api`; `"*"` allows any origin
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Metrics endpoint enabled
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,

    /// Upstream model settings
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Upload validation settings
    #[serde(default)]
    pub ingest: IngestConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            environment: default_environment(),
            timeout_secs: default_timeout_secs(),
            max_body_size_mb: default_max_body_size_mb(),
            allowed_origins: default_allowed_origins(),
            log_level: default_log_level(),
            metrics_enabled: default_true(),
            gemini: GeminiConfig::default(),
            ingest: IngestConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables and config files
    ///
    /// Call `dotenvy::dotenv()` first if a `.env` file should be honoured.
    pub fn load() -> anyhow::Result<Self> {
        let builder = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::with_name("server").required(false))
            // Override with environment variables
            .add_source(
                config::Environment::with_prefix("SEHATYAAD")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("allowed_origins")
                    .try_parsing(true),
            );

        let mut config: ServerConfig = builder.build()?.try_deserialize()?;
        config.apply_api_key_fallback(std::env::var(GEMINI_API_KEY_ENV).ok());

        Ok(config)
    }

    /// Use `key` when no API key came from the file or prefixed variables.
    pub fn apply_api_key_fallback(&mut self, key: Option<String>) {
        if self.gemini.api_key.trim().is_empty() {
            if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
                self.gemini.api_key = key;
            }
        }
    }

    /// Reject configurations the server cannot start with.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.gemini.validate().map_err(|e| match e {
            extract::ExtractError::NotConfigured(msg) => anyhow::anyhow!(msg),
            other => anyhow::anyhow!(other),
        })?;
        self.ingest.validate()?;
        if self.max_body_size_mb == 0 {
            anyhow::bail!("max_body_size_mb must be greater than zero");
        }
        if self.allowed_origins.is_empty() {
            anyhow::bail!("allowed_origins must not be empty; use \"*\" to allow any origin");
        }
        self.socket_addr()?;
        Ok(())
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get max body size in bytes
    pub fn max_body_size(&self) -> usize {
        self.max_body_size_mb * 1024 * 1024
    }

    /// True when any origin may call the API.
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_max_body_size_mb() -> usize {
    16
}

fn default_allowed_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.environment, "development");
        assert_eq!(cfg.timeout_secs, 300);
        assert_eq!(cfg.max_body_size_mb, 16);
        assert_eq!(cfg.max_body_size(), 16 * 1024 * 1024);
        assert!(cfg.allows_any_origin());
        assert!(cfg.metrics_enabled);
        assert_eq!(cfg.gemini.model, "gemini-2.5-pro");
    }

    #[test]
    fn test_socket_addr() {
        let cfg = ServerConfig::default();
        let addr = cfg.socket_addr().unwrap();
        assert_eq!(addr.port(), 5000);
    }

    #[test]
    fn missing_api_key_fails_validation() {
        let err = ServerConfig::default().validate().unwrap_err();
        assert_eq!(err.to_string(), "GEMINI_API_KEY is required");
    }

    #[test]
    fn api_key_fallback_only_fills_gaps() {
        let mut cfg = ServerConfig::default();
        cfg.apply_api_key_fallback(Some("from-env".into()));
        assert_eq!(cfg.gemini.api_key, "from-env");
        assert!(cfg.validate().is_ok());

        cfg.apply_api_key_fallback(Some("other".into()));
        assert_eq!(cfg.gemini.api_key, "from-env");

        let mut cfg = ServerConfig::default();
        cfg.apply_api_key_fallback(Some("   ".into()));
        assert!(cfg.gemini.api_key.is_empty());
    }

    #[test]
    fn rejects_bad_bind_addr() {
        let mut cfg = ServerConfig::default();
        cfg.gemini.api_key = "k".into();
        cfg.bind_addr = "not an address".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn deserializes_nested_sections() {
        let cfg: ServerConfig = serde_json::from_value(serde_json::json!({
            "port": 8000,
            "gemini": {"model": "gemini-2.5-flash"},
            "ingest": {"allowed_extensions": ["png"]}
        }))
        .unwrap();
        assert_eq!(cfg.port, 8000);
        assert_eq!(cfg.gemini.model, "gemini-2.5-flash");
        assert_eq!(cfg.gemini.connect_timeout_secs, 10);
        assert_eq!(cfg.ingest.allowed_extensions, vec!["png"]);
        assert_eq!(cfg.timeout_secs, 300);
    }
}
