//! Torrent listing and search handlers

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::{AppError, AppState};
use crate::provider::{wire, AnimeTorrent, ProviderCapabilities, SmartSearchOptions};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// Torrent body posted to the magnet route, only the link is read
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MagnetRequest {
    #[serde(deserialize_with = "wire::null_as_default")]
    pub magnet_link: String,
}

/// Provider capability descriptor
pub async fn settings(State(state): State<AppState>) -> Json<ProviderCapabilities> {
    Json(state.provider.settings())
}

/// Latest releases
pub async fn latest(
    State(state): State<AppState>,
) -> Result<Json<Vec<AnimeTorrent>>, AppError> {
    let torrents = state.provider.get_latest().await?;
    Ok(Json(torrents))
}

/// Free-text search
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<AnimeTorrent>>, AppError> {
    let torrents = state.provider.search(&params.q).await?;
    Ok(Json(torrents))
}

/// Smart search with episode / resolution / batch intent
pub async fn smart_search(
    State(state): State<AppState>,
    Json(options): Json<SmartSearchOptions>,
) -> Result<Json<Vec<AnimeTorrent>>, AppError> {
    let torrents = state.provider.smart_search(&options).await?;
    Ok(Json(torrents))
}

/// Resolve the magnet link of a torrent previously returned
pub async fn magnet(
    State(state): State<AppState>,
    Json(request): Json<MagnetRequest>,
) -> Json<serde_json::Value> {
    let torrent = AnimeTorrent {
        magnet_link: request.magnet_link,
        ..Default::default()
    };

    Json(json!({
        "magnetLink": state.provider.get_magnet_link(&torrent),
    }))
}
