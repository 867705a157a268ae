//! Load orchestration for datasets and notes
//!
//! Runs the dataset and note loaders side by side. Every one of the
//! fourteen loads is independent: each settles on its own and a failure
//! in one never reaches another.

use std::sync::Arc;

use tracing::info;

use crate::dataset::{DatasetLoader, DatasetOutcome};
use crate::fetch::ResourceFetcher;
use crate::notes::{LoadStatus, NoteLoader};
use crate::platform::{Platform, ResourceCatalog};
use crate::store::PlatformStore;
use crate::workbook::WorkbookParser;

/// Per-platform results of a full load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    pub datasets: Vec<(Platform, DatasetOutcome)>,
    pub notes: Vec<(Platform, LoadStatus)>,
}

impl LoadSummary {
    pub fn datasets_loaded(&self) -> usize {
        self.datasets
            .iter()
            .filter(|(_, o)| matches!(o, DatasetOutcome::Loaded { .. }))
            .count()
    }

    pub fn notes_loaded(&self) -> usize {
        self.notes
            .iter()
            .filter(|(_, s)| *s == LoadStatus::Loaded)
            .count()
    }
}

/// Owns both loaders and the store they publish into
pub struct ResourceLoader {
    catalog: Arc<ResourceCatalog>,
    store: Arc<PlatformStore>,
    datasets: DatasetLoader,
    notes: NoteLoader,
}

impl ResourceLoader {
    pub fn new(
        catalog: ResourceCatalog,
        fetcher: Arc<dyn ResourceFetcher>,
        parser: Arc<dyn WorkbookParser>,
        store: Arc<PlatformStore>,
    ) -> Self {
        let catalog = Arc::new(catalog);
        Self {
            datasets: DatasetLoader::new(
                Arc::clone(&catalog),
                Arc::clone(&fetcher),
                parser,
                Arc::clone(&store),
            ),
            notes: NoteLoader::new(Arc::clone(&catalog), fetcher, Arc::clone(&store)),
            catalog,
            store,
        }
    }

    pub fn store(&self) -> &Arc<PlatformStore> {
        &self.store
    }

    pub fn catalog(&self) -> &ResourceCatalog {
        &self.catalog
    }

    pub fn datasets(&self) -> &DatasetLoader {
        &self.datasets
    }

    pub fn notes(&self) -> &NoteLoader {
        &self.notes
    }

    /// Load every dataset and every note; resolves once all have settled
    pub async fn load_everything(&self) -> LoadSummary {
        info!(
            base_path = self.catalog.base_path(),
            platforms = Platform::ALL.len(),
            "Loading datasets and notes"
        );

        let (datasets, notes) = tokio::join!(self.datasets.load_all(), self.notes.load_all());
        let summary = LoadSummary { datasets, notes };

        info!(
            datasets_loaded = summary.datasets_loaded(),
            notes_loaded = summary.notes_loaded(),
            "Initial load settled"
        );
        summary
    }

    /// Fresh attempt for one platform's dataset and note
    ///
    /// Supersedes any attempt for the same platform still in flight.
    pub async fn reload_platform(&self, platform: Platform) -> (DatasetOutcome, LoadStatus) {
        info!(platform = %platform, "Reloading platform");
        tokio::join!(
            self.datasets.load_platform(platform),
            self.notes.load_platform(platform)
        )
    }
}
