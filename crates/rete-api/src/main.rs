//! rete API Server
//!
//! Serves the batch upload endpoint and the generated reports.

use rete_api::{create_router, state::AppState};
use rete_core::config::{AppConfig, LoggingConfig};
use rete_llm::create_llm_client;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rete_api=debug,rete_extractor=info,tower_http=debug".into());

    if logging.json_format {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::from_env()?;
    init_tracing(&config.logging);
    config.validate()?;
    config.storage.ensure_dirs()?;

    let llm = create_llm_client(&config.llm)?;
    tracing::info!(
        provider = ?config.llm.provider,
        model = llm.model(),
        "LLM client ready"
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);

    // Create application state
    let state = Arc::new(AppState::new(config, llm));

    // Create router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("rete API Server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);
    tracing::info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
