//! Platform notes and the note loader
//!
//! Each platform note moves through `idle → loading → {loaded | missing | error}`.
//! Every failure becomes a terminal status plus a diagnostic message shown in
//! place of the note, so nothing ever propagates out of a load.

use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::fetch::ResourceFetcher;
use crate::platform::{Platform, ResourceCatalog, ResourceKind};
use crate::store::PlatformStore;

/// Note shown before a platform's file has been fetched.
/// Authored with an escaped line break on purpose; see [`normalize_line_breaks`].
pub const DEFAULT_NOTE_TEXT: &str =
    "• Contact TechPubs for any information.\\n• This is a new fresh page, so expect faults.";

/// Lifecycle of one note fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    Idle,
    Loading,
    Loaded,
    Missing,
    Error,
}

impl LoadStatus {
    /// `loaded`, `missing` and `error` end an attempt
    pub fn is_terminal(self) -> bool {
        matches!(self, LoadStatus::Loaded | LoadStatus::Missing | LoadStatus::Error)
    }

    /// Short caption displayed under the notes panel
    pub fn caption(self) -> Option<&'static str> {
        match self {
            LoadStatus::Idle => None,
            LoadStatus::Loading => Some("Loading notes..."),
            LoadStatus::Loaded => Some("Notes loaded from file."),
            LoadStatus::Missing => Some("Notes file not found — please add to public/."),
            LoadStatus::Error => Some("Error loading notes — check console."),
        }
    }
}

/// Content and status of one platform's note
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteEntry {
    pub content: String,
    pub status: LoadStatus,
}

impl NoteEntry {
    /// Default text, not yet fetched
    pub fn initial() -> Self {
        Self {
            content: normalize_line_breaks(DEFAULT_NOTE_TEXT),
            status: LoadStatus::Idle,
        }
    }

    fn settled(content: String, status: LoadStatus) -> Self {
        Self { content, status }
    }
}

/// Replace every literal `\n` (backslash, letter n) with a real line break
///
/// Text that already uses real line breaks passes through unchanged.
pub fn normalize_line_breaks(text: &str) -> String {
    text.replace("\\n", "\n")
}

/// Fetches every platform's note file and tracks its status
pub struct NoteLoader {
    catalog: Arc<ResourceCatalog>,
    fetcher: Arc<dyn ResourceFetcher>,
    store: Arc<PlatformStore>,
}

impl NoteLoader {
    pub fn new(
        catalog: Arc<ResourceCatalog>,
        fetcher: Arc<dyn ResourceFetcher>,
        store: Arc<PlatformStore>,
    ) -> Self {
        Self {
            catalog,
            fetcher,
            store,
        }
    }

    /// Load all notes concurrently; returns each platform's terminal status
    pub async fn load_all(&self) -> Vec<(Platform, LoadStatus)> {
        let loads = Platform::ALL
            .into_iter()
            .map(|platform| async move { (platform, self.load_platform(platform).await) });

        join_all(loads).await
    }

    /// Load one platform's note
    ///
    /// Publishes `loading` immediately, then the terminal entry.
    pub async fn load_platform(&self, platform: Platform) -> LoadStatus {
        let locator = self.catalog.locator(platform, ResourceKind::Note);
        let attempt = self.store.begin_note_attempt(platform).await;

        let entry = self.retrieve(platform, locator).await;
        let status = entry.status;

        if !self.store.publish_note(attempt, entry).await {
            debug!(platform = %platform, locator, "Note discarded, newer attempt in flight");
        }
        status
    }

    async fn retrieve(&self, platform: Platform, locator: &str) -> NoteEntry {
        let text = match self.fetcher.fetch(locator).await {
            Ok(response) if !response.is_success() => {
                let message = format!(
                    "Notes file not found: {} (HTTP {}). Please add the file to the public/ folder.",
                    locator,
                    response.status()
                );
                warn!(platform = %platform, locator, status = response.status(), "{}", message);
                return NoteEntry::settled(message, LoadStatus::Missing);
            }
            Ok(response) => response.text(),
            Err(e) => Err(e),
        };

        match text {
            Ok(text) if text.trim().is_empty() => {
                info!(platform = %platform, locator, "Notes file is empty");
                NoteEntry::settled(format!("Notes file is empty: {}", locator), LoadStatus::Loaded)
            }
            Ok(text) => {
                info!(platform = %platform, locator, bytes = text.len(), "Notes loaded");
                NoteEntry::settled(normalize_line_breaks(&text), LoadStatus::Loaded)
            }
            Err(e) => {
                let message = format!("Error fetching {}: {}", locator, e);
                error!(platform = %platform, locator, error = %e, "Error fetching notes");
                NoteEntry::settled(message, LoadStatus::Error)
            }
        }
    }
}
