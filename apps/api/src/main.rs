mod config;
mod errors;
mod genai_client;
mod models;
mod optimizer;
mod render;
mod routes;
mod state;
#[cfg(test)]
mod testing;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::genai_client::GeminiClient;
use crate::optimizer::clock::TokioSleeper;
use crate::optimizer::latest::LatestResumeStore;
use crate::render::PdfRenderer;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resumex API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize AI client
    let ai = GeminiClient::new(config.gemini_api_key.clone(), config.gemini_base_url.clone())?;
    info!(
        "AI client initialized (model: {}, base: {})",
        config.gemini_model, config.gemini_base_url
    );
    info!(
        "Polling every {}ms, giving up after {}s",
        config.poll_interval_ms, config.poll_timeout_secs
    );

    // Build app state
    let state = AppState {
        config: config.clone(),
        ai: Arc::new(ai),
        sleeper: Arc::new(TokioSleeper),
        renderer: Arc::new(PdfRenderer::default()),
        latest: LatestResumeStore::default(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
