//! HTTP API handlers for vasi-viewer

pub mod buildinfo;
pub mod error;
pub mod health;
pub mod notes;
pub mod platforms;
pub mod sse;
pub mod table;
pub mod ui;

pub use buildinfo::get_build_info;
pub use error::ApiError;
pub use health::health_routes;
pub use notes::get_platform_notes;
pub use platforms::{list_platforms, reload_platform};
pub use sse::event_stream;
pub use table::get_platform_table;
pub use ui::{serve_app_js, serve_index};
