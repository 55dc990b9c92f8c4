mod config;
mod errors;
mod llm_client;
mod routes;
mod screening;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::{CallExecutor, KeyPool, LlmClient, ProviderSelection};
use crate::routes::build_router;
use crate::screening::pipeline::ScreeningPipeline;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Screener API v{}", env!("CARGO_PKG_VERSION"));

    let keys = Arc::new(KeyPool::new(config.api_keys));
    if keys.total_keys() == 0 {
        warn!("No API keys configured; every screening call will fail until keys are set");
    }

    let selection = ProviderSelection::resolve(&config.llm_provider, &config.models);
    info!(
        "LLM provider: {} (model: {}, max attempts: {}, timeout: {}s)",
        selection.provider, selection.model, config.max_attempts, config.request_timeout_secs
    );

    let transport = Arc::new(LlmClient::new(Duration::from_secs(
        config.request_timeout_secs,
    ))?);
    let executor = CallExecutor::new(keys, selection, transport);
    let pipeline = Arc::new(ScreeningPipeline::new(executor, config.max_attempts));

    let state = AppState { pipeline };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the upload UI has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
