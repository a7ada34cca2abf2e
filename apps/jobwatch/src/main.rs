mod config;
mod errors;
mod extraction;
mod host;
mod messenger;
mod navigation;
mod page_context;
mod panel;
mod routes;
mod scoring;
mod session;
mod state;
mod watch;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::scoring::HttpScoringBackend;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting jobwatch v{}", env!("CARGO_PKG_VERSION"));

    let scoring = Arc::new(HttpScoringBackend::new(&config.scoring_api_url)?);
    info!("Scoring backend: {}", config.scoring_api_url);

    info!(
        "Timings: extraction debounce {:?}, url poll {:?}, launcher debounce {:?}",
        config.extraction_debounce, config.url_poll_interval, config.launcher_debounce
    );

    let state = AppState::new(config.clone(), scoring);
    let page = state.page.clone();

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // the page shim and panel run on other origins

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Detach observers and clear the record before exiting.
    page.teardown().await;
    info!("Shut down cleanly");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
