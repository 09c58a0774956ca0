//! Application state management
//!
//! Author: hephaex@gmail.com

use concierge_core::{AppConfig, LlmClient};
use concierge_rag::QueryResponder;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Question responder
    pub responder: QueryResponder,
    /// Server start time
    pub start_time: Instant,
    /// Request counter
    pub request_count: AtomicU64,
}

impl AppState {
    /// Create state with the OpenAI-backed responder
    pub fn new(config: AppConfig) -> concierge_core::Result<Self> {
        let responder = QueryResponder::from_config(&config)?;
        Ok(Self::with_responder(config, responder))
    }

    /// Create state around a specific completion client
    pub fn with_llm_client(config: AppConfig, llm_client: Arc<dyn LlmClient>) -> Self {
        let responder = QueryResponder::new(llm_client, &config);
        Self::with_responder(config, responder)
    }

    fn with_responder(config: AppConfig, responder: QueryResponder) -> Self {
        Self {
            config,
            responder,
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
        }
    }

    /// Increment request counter
    pub fn increment_requests(&self) -> u64 {
        self.request_count.fetch_add(1, Ordering::SeqCst)
    }

    /// Get total request count
    pub fn get_request_count(&self) -> u64 {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Ready once a completion credential is configured
    pub fn is_ready(&self) -> bool {
        self.responder.is_configured()
    }
}
