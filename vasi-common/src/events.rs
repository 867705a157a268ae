//! Load progress events
//!
//! Broadcast by [`crate::store::PlatformStore`] on every state change so the
//! presentation layer can refresh only what settled.

use serde::Serialize;

use crate::notes::LoadStatus;
use crate::platform::Platform;

/// State change for one platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum LoadEvent {
    /// A new dataset replaced the previous one
    DatasetPublished { platform: Platform, row_count: usize },

    /// The dataset attempt finished, whether or not it published
    DatasetSettled { platform: Platform, row_count: usize },

    /// Note status or content changed
    NoteChanged { platform: Platform, status: LoadStatus },
}

impl LoadEvent {
    /// SSE event name
    pub fn event_type(&self) -> &'static str {
        match self {
            LoadEvent::DatasetPublished { .. } => "DatasetPublished",
            LoadEvent::DatasetSettled { .. } => "DatasetSettled",
            LoadEvent::NoteChanged { .. } => "NoteChanged",
        }
    }

    pub fn platform(&self) -> Platform {
        match self {
            LoadEvent::DatasetPublished { platform, .. }
            | LoadEvent::DatasetSettled { platform, .. }
            | LoadEvent::NoteChanged { platform, .. } => *platform,
        }
    }
}
