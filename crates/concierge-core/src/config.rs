//! Concierge Configuration Management
//!
//! Handles configuration from environment variables and config files
//! with sensible defaults for development.

use crate::guide::DEFAULT_LANG;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Completion API configuration
    pub llm: LlmConfig,

    /// Snippet retrieval limits
    pub retrieval: RetrievalConfig,

    /// Names used in the system prompt
    pub persona: PersonaConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Server
        if let Ok(host) = std::env::var("API_HOST") {
            config.server.host = host;
        }
        if let Ok(port) = std::env::var("API_PORT") {
            config.server.port = parse_var("API_PORT", port)?;
        }
        if let Ok(secs) = std::env::var("REQUEST_TIMEOUT_SECS") {
            config.server.request_timeout_secs = parse_var("REQUEST_TIMEOUT_SECS", secs)?;
        }

        // CORS origins from environment variable (comma-separated)
        if let Ok(origins) = std::env::var("CORS_ORIGINS") {
            config.server.cors_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // LLM
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.trim().is_empty() {
                config.llm.openai_api_key = Some(key);
            }
        }
        if let Ok(url) = std::env::var("OPENAI_BASE_URL") {
            config.llm.openai_base_url = url;
        }
        if let Ok(model) = std::env::var("LLM_MODEL") {
            config.llm.model = model;
        }
        if let Ok(secs) = std::env::var("LLM_TIMEOUT_SECS") {
            config.llm.timeout_secs = parse_var("LLM_TIMEOUT_SECS", secs)?;
        }

        // Persona
        if let Ok(name) = std::env::var("CONCIERGE_NAME") {
            config.persona.assistant_name = name;
        }
        if let Ok(name) = std::env::var("CONCIERGE_PROPERTY") {
            config.persona.property_name = name;
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(json) = std::env::var("LOG_JSON") {
            config.logging.json_format = parse_var("LOG_JSON", json)?;
        }

        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        let env = Self::from_env()?;
        let is_set = |key: &str| std::env::var_os(key).is_some();

        // Server
        if is_set("API_HOST") {
            self.server.host = env.server.host;
        }
        if is_set("API_PORT") {
            self.server.port = env.server.port;
        }
        if is_set("REQUEST_TIMEOUT_SECS") {
            self.server.request_timeout_secs = env.server.request_timeout_secs;
        }
        if !env.server.cors_origins.is_empty() {
            self.server.cors_origins = env.server.cors_origins;
        }

        // LLM; the key always comes from env when present
        if env.llm.openai_api_key.is_some() {
            self.llm.openai_api_key = env.llm.openai_api_key;
        }
        if is_set("OPENAI_BASE_URL") {
            self.llm.openai_base_url = env.llm.openai_base_url;
        }
        if is_set("LLM_MODEL") {
            self.llm.model = env.llm.model;
        }
        if is_set("LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = env.llm.timeout_secs;
        }

        // Persona
        if is_set("CONCIERGE_NAME") {
            self.persona.assistant_name = env.persona.assistant_name;
        }
        if is_set("CONCIERGE_PROPERTY") {
            self.persona.property_name = env.persona.property_name;
        }

        // Logging
        if is_set("LOG_LEVEL") {
            self.logging.level = env.logging.level;
        }
        if is_set("LOG_JSON") {
            self.logging.json_format = env.logging.json_format;
        }

        Ok(self)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value,
    })
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// Maximum request body size in bytes
    pub max_body_size: usize,

    /// Allowed origins for CORS (empty allows none)
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 60,
            max_body_size: 2 * 1024 * 1024, // 2MB
            cors_origins: vec![],
        }
    }
}

/// Completion API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// OpenAI API key. Requests fail with a configuration error without it.
    pub openai_api_key: Option<String>,

    /// OpenAI API base URL (for compatible APIs)
    pub openai_base_url: String,

    /// Model name to use
    pub model: String,

    /// Temperature for generation
    pub temperature: f32,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl LlmConfig {
    pub fn has_api_key(&self) -> bool {
        self.openai_api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.2,
            timeout_secs: 60,
        }
    }
}

/// Snippet retrieval limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Question tokens considered for matching
    pub max_question_tokens: usize,

    /// Shorter tokens, in UTF-16 code units, are ignored
    pub min_token_chars: usize,

    /// Snippets kept in the context block
    pub max_snippets: usize,

    /// Language used when the requested one is missing
    pub default_lang: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_question_tokens: 24,
            min_token_chars: 2,
            max_snippets: 18,
            default_lang: DEFAULT_LANG.to_string(),
        }
    }
}

/// Names used in the system prompt
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonaConfig {
    /// Name the assistant introduces itself with
    pub assistant_name: String,

    /// Name of the rental property
    pub property_name: String,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            assistant_name: "Blue".to_string(),
            property_name: "Out of the Blue".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
