//! HTTP API layer

mod error;
pub mod handlers;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    compression::CompressionLayer,
    trace::TraceLayer,
};

use crate::config::Settings;
use crate::provider::AnimeProvider;

pub use error::AppError;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub provider: Arc<dyn AnimeProvider>,
}

impl AppState {
    pub fn new(settings: Settings, provider: Arc<dyn AnimeProvider>) -> Self {
        Self { settings, provider }
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Health check
        .route("/health", get(handlers::health))

        // Provider capabilities
        .route("/settings", get(handlers::torrents::settings))

        // Torrents
        .route("/latest", get(handlers::torrents::latest))
        .route("/search", get(handlers::torrents::search))
        .route("/smart-search", post(handlers::torrents::smart_search))
        .route("/magnet", post(handlers::torrents::magnet));

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}
