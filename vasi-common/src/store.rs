//! Per-platform load state
//!
//! One slot per platform holding its dataset and note entry. Loaders are the
//! only writers and replace whole values under the write lock, so readers
//! always see either the previous value or the new one.
//!
//! Each load attempt takes a generation number. A publish from an attempt
//! that has since been superseded by a newer one is dropped, so results of
//! two attempts for the same platform never interleave.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{broadcast, RwLock};

use crate::dataset::Dataset;
use crate::events::LoadEvent;
use crate::notes::{LoadStatus, NoteEntry};
use crate::platform::Platform;

const EVENT_CHANNEL_CAPACITY: usize = 128;

/// Ticket for one load attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempt {
    platform: Platform,
    generation: u64,
}

impl Attempt {
    pub fn platform(&self) -> Platform {
        self.platform
    }
}

struct PlatformSlot {
    dataset: Arc<Dataset>,
    dataset_generation: u64,
    dataset_pending: bool,
    note: NoteEntry,
    note_generation: u64,
}

impl PlatformSlot {
    fn new() -> Self {
        Self {
            dataset: Arc::new(Dataset::default()),
            dataset_generation: 0,
            // Nothing has settled yet
            dataset_pending: true,
            note: NoteEntry::initial(),
            note_generation: 0,
        }
    }
}

/// Summary row for the tab list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformSnapshot {
    pub platform: Platform,
    pub row_count: usize,
    pub dataset_pending: bool,
    pub note_status: LoadStatus,
}

/// Shared state for all platforms
///
/// Uses RwLock for concurrent read access with rare writes.
pub struct PlatformStore {
    slots: RwLock<Vec<PlatformSlot>>,
    event_tx: broadcast::Sender<LoadEvent>,
}

impl PlatformStore {
    /// Empty datasets and idle notes for every platform
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            slots: RwLock::new(Platform::ALL.iter().map(|_| PlatformSlot::new()).collect()),
            event_tx,
        }
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> broadcast::Receiver<LoadEvent> {
        self.event_tx.subscribe()
    }

    fn broadcast(&self, event: LoadEvent) {
        // No receivers is fine
        let _ = self.event_tx.send(event);
    }

    // ------------------------------------------------------------------
    // Readers
    // ------------------------------------------------------------------

    pub async fn dataset(&self, platform: Platform) -> Arc<Dataset> {
        Arc::clone(&self.slots.read().await[platform.index()].dataset)
    }

    /// True until a dataset attempt for `platform` settles, and again while a
    /// newer attempt is in flight
    pub async fn dataset_pending(&self, platform: Platform) -> bool {
        self.slots.read().await[platform.index()].dataset_pending
    }

    /// Dataset and pending flag read under one lock, so they always agree
    pub async fn dataset_state(&self, platform: Platform) -> (Arc<Dataset>, bool) {
        let slots = self.slots.read().await;
        let slot = &slots[platform.index()];
        (Arc::clone(&slot.dataset), slot.dataset_pending)
    }

    pub async fn note(&self, platform: Platform) -> NoteEntry {
        self.slots.read().await[platform.index()].note.clone()
    }

    /// One summary per platform, in tab order
    pub async fn snapshot(&self) -> Vec<PlatformSnapshot> {
        let slots = self.slots.read().await;
        Platform::ALL
            .into_iter()
            .zip(slots.iter())
            .map(|(platform, slot)| PlatformSnapshot {
                platform,
                row_count: slot.dataset.len(),
                dataset_pending: slot.dataset_pending,
                note_status: slot.note.status,
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Dataset writers
    // ------------------------------------------------------------------

    /// Start a dataset attempt; supersedes any attempt already in flight
    pub async fn begin_dataset_attempt(&self, platform: Platform) -> Attempt {
        let mut slots = self.slots.write().await;
        let slot = &mut slots[platform.index()];
        slot.dataset_generation += 1;
        slot.dataset_pending = true;
        Attempt {
            platform,
            generation: slot.dataset_generation,
        }
    }

    /// Replace the dataset; returns false if `attempt` was superseded
    pub async fn publish_dataset(&self, attempt: Attempt, dataset: Dataset) -> bool {
        let row_count = dataset.len();
        {
            let mut slots = self.slots.write().await;
            let slot = &mut slots[attempt.platform.index()];
            if slot.dataset_generation != attempt.generation {
                return false;
            }
            slot.dataset = Arc::new(dataset);
        }

        self.broadcast(LoadEvent::DatasetPublished {
            platform: attempt.platform,
            row_count,
        });
        true
    }

    /// Mark the attempt finished; no-op if it was superseded
    pub async fn finish_dataset_attempt(&self, attempt: Attempt) {
        let row_count = {
            let mut slots = self.slots.write().await;
            let slot = &mut slots[attempt.platform.index()];
            if slot.dataset_generation != attempt.generation {
                return;
            }
            slot.dataset_pending = false;
            slot.dataset.len()
        };

        self.broadcast(LoadEvent::DatasetSettled {
            platform: attempt.platform,
            row_count,
        });
    }

    // ------------------------------------------------------------------
    // Note writers
    // ------------------------------------------------------------------

    /// Start a note attempt: status becomes `loading`, content is kept
    pub async fn begin_note_attempt(&self, platform: Platform) -> Attempt {
        let generation = {
            let mut slots = self.slots.write().await;
            let slot = &mut slots[platform.index()];
            slot.note_generation += 1;
            slot.note.status = LoadStatus::Loading;
            slot.note_generation
        };

        self.broadcast(LoadEvent::NoteChanged {
            platform,
            status: LoadStatus::Loading,
        });
        Attempt {
            platform,
            generation,
        }
    }

    /// Replace the note entry; returns false if `attempt` was superseded
    pub async fn publish_note(&self, attempt: Attempt, entry: NoteEntry) -> bool {
        let status = entry.status;
        {
            let mut slots = self.slots.write().await;
            let slot = &mut slots[attempt.platform.index()];
            if slot.note_generation != attempt.generation {
                return false;
            }
            slot.note = entry;
        }

        self.broadcast(LoadEvent::NoteChanged {
            platform: attempt.platform,
            status,
        });
        true
    }
}

impl Default for PlatformStore {
    fn default() -> Self {
        Self::new()
    }
}
