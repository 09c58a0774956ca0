//! Concierge RAG - Retrieval-Augmented Generation over the guest guide
//!
//! This crate implements the question answering pipeline:
//! - Keyword retrieval over the guide sections (tag-weighted)
//! - Context block and localized prompt assembly
//! - A single completion API call per question
//!
//! Author: hephaex@gmail.com

use concierge_core::{
    AppConfig, ChatPrompt, ConciergeError, ConciergeRequest, ConciergeResponse, DebugInfo,
    LlmClient, PersonaConfig, Result,
};
use std::sync::Arc;
use std::time::Instant;

pub mod llm;
pub mod prompt;
pub mod retrieval;

pub use llm::{parse_answer, OpenAiClient};
pub use prompt::{PromptBuilder, HEBREW_LANG};
pub use retrieval::{Retrieval, Retriever, NO_EXCERPTS_PLACEHOLDER};

// ============================================================================
// Query Responder
// ============================================================================

/// Retrieved excerpts and the prompt built from them
#[derive(Debug, Clone)]
pub struct PreparedQuery {
    pub retrieval: Retrieval,
    pub prompt: ChatPrompt,
}

/// Answers guest questions from the guide supplied with each request
pub struct QueryResponder {
    /// Completion client
    llm_client: Arc<dyn LlmClient>,

    /// Whether a completion credential is configured
    credential_configured: bool,

    /// Keyword retriever
    retriever: Retriever,

    /// Names used in the system prompt
    persona: PersonaConfig,
}

impl QueryResponder {
    /// Create a responder around an existing completion client
    pub fn new(llm_client: Arc<dyn LlmClient>, config: &AppConfig) -> Self {
        Self {
            llm_client,
            credential_configured: config.llm.has_api_key(),
            retriever: Retriever::new(config.retrieval.clone()),
            persona: config.persona.clone(),
        }
    }

    /// Create a responder backed by the OpenAI client
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = OpenAiClient::from_config(&config.llm)?;
        Ok(Self::new(Arc::new(client), config))
    }

    /// Fail when no completion credential is configured
    pub fn ensure_configured(&self) -> Result<()> {
        if self.credential_configured {
            Ok(())
        } else {
            Err(ConciergeError::ConfigError(
                "Missing OPENAI_API_KEY in environment".to_string(),
            ))
        }
    }

    pub fn is_configured(&self) -> bool {
        self.credential_configured
    }

    pub fn model(&self) -> &str {
        self.llm_client.model()
    }

    /// Retrieve excerpts and build the prompt without calling the model
    pub fn prepare(&self, request: &ConciergeRequest) -> Result<PreparedQuery> {
        let question = request.question()?;
        let lang = request.lang();

        let retrieval = self
            .retriever
            .retrieve(&request.content, lang, request.suite, question);

        let prompt = PromptBuilder::new(&self.persona)
            .lang(lang)
            .question(question)
            .context(retrieval.context.as_str())
            .build();

        Ok(PreparedQuery { retrieval, prompt })
    }

    /// Answer one guest question
    pub async fn respond(&self, request: &ConciergeRequest) -> Result<ConciergeResponse> {
        let start_time = Instant::now();
        self.ensure_configured()?;

        let PreparedQuery { retrieval, prompt } = self.prepare(request)?;
        let matched = retrieval.matched();

        tracing::info!(
            lang = request.lang(),
            suite = request.suite.map(|s| s.id()),
            candidates = retrieval.candidates,
            matched,
            prompt_chars = prompt.len(),
            model = self.llm_client.model(),
            "calling completion API"
        );

        let answer = self.llm_client.generate(&prompt).await?;

        tracing::info!(
            answer_chars = answer.chars().count(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "answer received"
        );

        Ok(ConciergeResponse {
            answer: answer.trim().to_string(),
            debug: DebugInfo { matched },
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
