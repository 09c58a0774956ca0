//! Concierge API Server
//!
//! Author: hephaex@gmail.com

use concierge_api::{create_router, state::AppState, NETLIFY_FUNCTION_PATH};
use concierge_core::{AppConfig, LoggingConfig};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = match std::env::var("CONCIERGE_CONFIG") {
        Ok(path) => AppConfig::from_file(path)?.with_env_override()?,
        Err(_) => AppConfig::from_env()?,
    };

    init_tracing(&config.logging);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    if !config.llm.has_api_key() {
        tracing::warn!("OPENAI_API_KEY is not set; questions will fail until it is configured");
    }

    // Create application state
    let state = Arc::new(AppState::new(config)?);
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Concierge API starting on http://{}", addr);
    tracing::info!("Questions accepted at /api/concierge and {}", NETLIFY_FUNCTION_PATH);
    tracing::info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "concierge_api={level},concierge_rag={level},tower_http={level}",
            level = logging.level
        )
        .into()
    });

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received");
}
