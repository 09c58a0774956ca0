//! Completion API client
//!
//! Talks to an OpenAI-compatible "chat completions" endpoint. One request
//! per call, no retries; failures are surfaced with the upstream status and
//! raw body.
//!
//! Author: hephaex@gmail.com

use async_trait::async_trait;
use concierge_core::{ChatMessage, ChatPrompt, ConciergeError, LlmClient, LlmConfig, Result};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

const UPSTREAM_FAILED: &str = "OpenAI request failed";
const UPSTREAM_INVALID: &str = "Invalid response from OpenAI";

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage>,
}

/// Extract the answer text from a raw completion response body.
///
/// Only a body that is not JSON is an error. `output_text` wins when it is a
/// non-empty string, then `choices[0].message.content`; any other shape
/// yields an empty answer.
pub fn parse_answer(raw: &str) -> Result<String> {
    let body: Value = serde_json::from_str(raw)
        .map_err(|e| ConciergeError::upstream(UPSTREAM_INVALID, None, format!("{e}: {raw}")))?;

    let text = body
        .get("output_text")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .or_else(|| {
            body.pointer("/choices/0/message/content")
                .and_then(Value::as_str)
        })
        .unwrap_or_default();

    Ok(text.trim().to_string())
}

// ============================================================================
// OpenAI Client
// ============================================================================

/// OpenAI API client
pub struct OpenAiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    temperature: f32,
}

impl OpenAiClient {
    /// Create a new OpenAI client
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            client: Client::new(),
            api_key: Some(api_key.into()),
            base_url: LlmConfig::default().openai_base_url,
            model: model.into(),
            temperature,
        }
    }

    /// Create from config. A missing key is allowed here; `generate` refuses
    /// to send anything until one is configured.
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("guest-concierge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConciergeError::ConfigError(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config
                .openai_api_key
                .clone()
                .filter(|key| !key.trim().is_empty()),
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    /// Set custom base URL (for compatible APIs)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn generate(&self, prompt: &ChatPrompt) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ConciergeError::ConfigError("Missing OPENAI_API_KEY".to_string()))?;

        let request = ChatCompletionRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: prompt.messages(),
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "completion request could not be sent");
                ConciergeError::upstream(UPSTREAM_FAILED, None, e.to_string())
            })?;

        let status = response.status();
        let raw = response.text().await.map_err(|e| {
            ConciergeError::upstream(UPSTREAM_FAILED, Some(status.as_u16()), e.to_string())
        })?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "completion API returned an error");
            return Err(ConciergeError::upstream(
                UPSTREAM_FAILED,
                Some(status.as_u16()),
                raw,
            ));
        }

        parse_answer(&raw)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// ============================================================================
// Tests
// ============================================================================
