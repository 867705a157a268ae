//! Server-Sent Events (SSE) for load progress

use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::Stream;

use crate::AppState;

/// GET /api/events - SSE stream of dataset and note state changes
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    vasi_common::sse::create_load_event_sse_stream("vasi-viewer", state.store.subscribe())
}
