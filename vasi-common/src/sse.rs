//! Server-Sent Events (SSE) utilities
//!
//! Turns the store's load events into an SSE stream.

use std::convert::Infallible;
use std::time::Duration;

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use crate::events::LoadEvent;

/// Stream every [`LoadEvent`] as an SSE message named after its type
///
/// Sends `ConnectionStatus: connected` first. If the receiver lags, a
/// `Resync` event tells the client to refetch everything.
///
/// # Example
/// ```rust,ignore
/// pub async fn event_stream(
///     State(state): State<AppState>,
/// ) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
///     vasi_common::sse::create_load_event_sse_stream("vasi-viewer", state.store.subscribe())
/// }
/// ```
pub fn create_load_event_sse_stream(
    service_name: &'static str,
    mut events: broadcast::Receiver<LoadEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("New SSE client connected to {} load events", service_name);

    let stream = async_stream::stream! {
        yield Ok(Event::default()
            .event("ConnectionStatus")
            .data("connected"));

        loop {
            match events.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(json) => {
                        debug!(event = event.event_type(), platform = %event.platform(), "SSE: forwarding");
                        yield Ok(Event::default().event(event.event_type()).data(json));
                    }
                    Err(e) => warn!("SSE: failed to serialize load event: {}", e),
                },
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "SSE: client lagged behind load events");
                    yield Ok(Event::default().event("Resync").data(skipped.to_string()));
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("heartbeat"),
    )
}
