//! Concierge Core - Domain models, traits, and shared types
//!
//! This crate defines the core abstractions used throughout the concierge:
//! - Guide document model (languages, sections, suites)
//! - Snippets and their relevance scores
//! - Request and response payloads
//! - Common error types
//! - The completion client trait
//! - Configuration management

pub mod config;
pub mod guide;

pub use config::{
    AppConfig, ConfigError, LlmConfig, LoggingConfig, PersonaConfig, RetrievalConfig,
    ServerConfig,
};
pub use guide::{GuideDocument, LocalizedGuide, SectionContent, Sections, Suite, SuiteContent};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for concierge operations
#[derive(Error, Debug)]
pub enum ConciergeError {
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("{message}")]
    UpstreamError {
        message: String,
        /// HTTP status returned by the completion API, if one was received
        status: Option<u16>,
        /// Raw upstream body or transport error text
        details: String,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConciergeError {
    /// Upstream failure carrying the raw response body
    pub fn upstream(
        message: impl Into<String>,
        status: Option<u16>,
        details: impl Into<String>,
    ) -> Self {
        Self::UpstreamError {
            message: message.into(),
            status,
            details: details.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConciergeError>;

// ============================================================================
// Snippets
// ============================================================================

/// A single tagged unit of guide text considered for relevance scoring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    /// Provenance label, e.g. `rules` or `arrival-313`
    pub tag: String,

    /// Trimmed guide text
    pub text: String,
}

impl Snippet {
    pub fn new(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            text: text.into(),
        }
    }
}

/// A snippet with its weighted relevance score
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredSnippet {
    pub snippet: Snippet,

    /// Weighted score (raw token matches times the tag multiplier)
    pub score: u32,
}

impl ScoredSnippet {
    pub fn tag(&self) -> &str {
        &self.snippet.tag
    }

    pub fn text(&self) -> &str {
        &self.snippet.text
    }
}

// ============================================================================
// Prompt Types
// ============================================================================

/// Role of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// System/user prompt pair sent to the completion API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatPrompt {
    pub system: String,
    pub user: String,
}

impl ChatPrompt {
    /// Messages in wire order: system first, then user
    pub fn messages(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage {
                role: ChatRole::System,
                content: self.system.clone(),
            },
            ChatMessage {
                role: ChatRole::User,
                content: self.user.clone(),
            },
        ]
    }

    /// Total prompt size in characters
    pub fn len(&self) -> usize {
        self.system.chars().count() + self.user.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.system.is_empty() && self.user.is_empty()
    }
}

// ============================================================================
// Request / Response
// ============================================================================

/// Guest question payload
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ConciergeRequest {
    /// Guest question (required, trimmed)
    #[serde(default)]
    pub question: Option<String>,

    /// Language code; `he` when omitted
    #[serde(default, deserialize_with = "guide::lenient_lang")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, example = "en"))]
    pub lang: Option<String>,

    /// Room identifier; unknown values mean "no suite"
    #[serde(default, deserialize_with = "guide::lenient_suite")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, example = "313"))]
    pub suite: Option<Suite>,

    /// Full guide document
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub content: GuideDocument,
}

impl ConciergeRequest {
    /// Create a request for a question with an empty guide
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: Some(question.into()),
            ..Default::default()
        }
    }

    /// Parse a raw request body. An empty body is treated as `{}`.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
            .map_err(|e| ConciergeError::ValidationError(format!("Invalid JSON body: {e}")))
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    pub fn with_suite(mut self, suite: Option<Suite>) -> Self {
        self.suite = suite;
        self
    }

    pub fn with_content(mut self, content: GuideDocument) -> Self {
        self.content = content;
        self
    }

    /// Trimmed question, rejected when empty
    pub fn question(&self) -> Result<&str> {
        match self.question.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => Ok(q),
            _ => Err(ConciergeError::ValidationError("Missing question".to_string())),
        }
    }

    /// Requested language, defaulting to Hebrew
    pub fn lang(&self) -> &str {
        self.lang.as_deref().unwrap_or(guide::DEFAULT_LANG)
    }
}

/// Diagnostic information attached to an answer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DebugInfo {
    /// Number of snippets that made it into the context
    pub matched: usize,
}

/// Answer returned to the guest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ConciergeResponse {
    /// Model answer (may state that the guide has no information)
    pub answer: String,

    pub debug: DebugInfo,
}

// ============================================================================
// Traits
// ============================================================================

/// Trait for completion API clients
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a system/user prompt pair and return the answer text
    async fn generate(&self, prompt: &ChatPrompt) -> Result<String>;

    /// Model identifier, for logging
    fn model(&self) -> &str;
}

// ============================================================================
// Tests
// ============================================================================
