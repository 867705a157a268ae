//! Notes panel API

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use vasi_common::{LoadStatus, Platform};

use super::ApiError;
use crate::AppState;

/// Notes panel content for one platform
#[derive(Debug, Serialize)]
pub struct NotesResponse {
    pub platform: Platform,
    pub label: &'static str,
    pub content: String,
    pub status: LoadStatus,
    /// Status caption, absent while idle
    pub caption: Option<&'static str>,
}

/// GET /api/platforms/:id/notes
pub async fn get_platform_notes(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<NotesResponse>, ApiError> {
    let platform = ApiError::platform(&id)?;
    let note = state.store.note(platform).await;

    Ok(Json(NotesResponse {
        platform,
        label: platform.label(),
        caption: note.status.caption(),
        content: note.content,
        status: note.status,
    }))
}
