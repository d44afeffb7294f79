//! subfeed - A lightweight, self-hosted SubsPlease feed adapter
//!
//! subfeed fetches the SubsPlease release feed, normalizes every release into
//! one torrent record per resolution and serves latest, search and smart
//! search results to a host application over a small JSON API.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

mod api;
mod config;
mod provider;
mod service;
mod utils;

use api::AppState;
use config::{LogFormat, Settings};
use provider::{HttpFeedFetcher, SubsPleaseProvider};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::load()?;

    // Initialize logging
    init_tracing(settings.logging.format);

    info!("Starting subfeed v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded from {:?}", settings.config_path());

    // Build the feed provider
    let fetcher = HttpFeedFetcher::new(&settings.feed)
        .context("Failed to create feed client")?;
    let provider = SubsPleaseProvider::new(Arc::new(fetcher));
    info!(
        "Using feed {} (timezone {})",
        settings.feed.base_url, settings.feed.timezone
    );

    // Create application state
    let state = AppState::new(settings.clone(), Arc::new(provider));

    // Build router
    let app = api::create_router(state);

    // Start server
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "subfeed=info,tower_http=info".into());

    match format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
    }
}
