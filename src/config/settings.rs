use serde::Deserialize;

use crate::utils::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_HTTP_TIMEOUT_MS, DEFAULT_TOKEN_TTL_SECS, ENV_API_BASE_URL,
    ENV_API_TIMEOUT_MS,
};

/// ================================
/// Full client configuration
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// per request, a 401 retry gets its own budget
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// lifetime assumed for tokens handed out by the provider
    #[serde(default = "default_token_ttl_seconds")]
    pub token_ttl_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            token_ttl_seconds: default_token_ttl_seconds(),
        }
    }
}

impl ClientConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.api.apply_env();
        config
    }
}

impl ApiConfig {
    pub fn apply_env(&mut self) {
        if let Some(base_url) = std::env::var(ENV_API_BASE_URL).ok().filter(|v| !v.trim().is_empty()) {
            self.base_url = base_url;
        }
        if let Some(timeout_ms) = std::env::var(ENV_API_TIMEOUT_MS).ok().and_then(|v| v.trim().parse().ok()) {
            self.timeout_ms = timeout_ms;
        }
    }
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String, // allowed: trace, debug, info, warn, error
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new (level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new("info".to_owned(), LogFormat::Compact)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Compact,
}

fn default_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_HTTP_TIMEOUT_MS
}

fn default_token_ttl_seconds() -> u64 {
    DEFAULT_TOKEN_TTL_SECS
}
