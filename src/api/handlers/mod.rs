//! API request handlers

pub mod torrents;

use axum::{extract::State, Json};
use serde_json::json;

use super::AppState;

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "feed": state.settings.feed.base_url,
    }))
}
