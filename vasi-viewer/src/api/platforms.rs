//! Platform tab list and reload

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::info;
use vasi_common::{LoadStatus, Platform};

use super::ApiError;
use crate::AppState;

/// One tab in the platform list
#[derive(Debug, Serialize)]
pub struct PlatformSummary {
    pub id: Platform,
    pub label: &'static str,
    pub row_count: usize,
    pub dataset_pending: bool,
    pub note_status: LoadStatus,
}

/// GET /api/platforms
///
/// All platforms in tab order with their current load state.
pub async fn list_platforms(State(state): State<AppState>) -> Json<Vec<PlatformSummary>> {
    let summaries = state
        .store
        .snapshot()
        .await
        .into_iter()
        .map(|s| PlatformSummary {
            id: s.platform,
            label: s.platform.label(),
            row_count: s.row_count,
            dataset_pending: s.dataset_pending,
            note_status: s.note_status,
        })
        .collect();

    Json(summaries)
}

/// Reload acknowledgement
#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub id: Platform,
    pub reloading: bool,
}

/// POST /api/platforms/:id/reload
///
/// Starts a fresh dataset and note attempt in the background; progress
/// arrives over /api/events.
pub async fn reload_platform(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<ReloadResponse>), ApiError> {
    let platform = ApiError::platform(&id)?;
    info!(platform = %platform, "Reload requested");

    let loader = state.loader.clone();
    tokio::spawn(async move {
        loader.reload_platform(platform).await;
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(ReloadResponse {
            id: platform,
            reloading: true,
        }),
    ))
}
