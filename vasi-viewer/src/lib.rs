//! vasi-viewer library - sizing information viewer
//!
//! Serves the loaded datasets and notes as a JSON API plus a small static
//! UI. Loading runs in the background; every endpoint answers with whatever
//! has settled so far.

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;
use vasi_common::{PlatformStore, ResourceLoader};

pub mod api;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Live per-platform state (read side)
    pub store: Arc<PlatformStore>,
    /// Loaders, used for reloads
    pub loader: Arc<ResourceLoader>,
}

impl AppState {
    /// Create new application state
    pub fn new(loader: Arc<ResourceLoader>) -> Self {
        Self {
            store: Arc::clone(loader.store()),
            loader,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let api = Router::new()
        .route("/api/platforms", get(api::list_platforms))
        .route("/api/platforms/:id/table", get(api::get_platform_table))
        .route("/api/platforms/:id/notes", get(api::get_platform_notes))
        .route("/api/platforms/:id/reload", post(api::reload_platform))
        .route("/api/events", get(api::event_stream))
        .route("/api/buildinfo", get(api::get_build_info));

    let public = Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .merge(api::health_routes());

    Router::new()
        .merge(api)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
