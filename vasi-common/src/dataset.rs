//! Datasets and the dataset loader
//!
//! A [`Dataset`] is the parsed first sheet of one platform's workbook. Rows
//! share one column list (the header row), so every record carries the full
//! key set in header order.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, error, info, warn};

use crate::fetch::ResourceFetcher;
use crate::platform::{Platform, ResourceCatalog, ResourceKind};
use crate::store::PlatformStore;
use crate::workbook::{Sheet, WorkbookParser};
use crate::Result;

/// Header name given to blank header cells
const EMPTY_HEADER: &str = "__EMPTY";

/// One row: column name → cell text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRecord {
    columns: Arc<[String]>,
    values: Vec<String>,
}

impl RowRecord {
    /// Value of `column`, `None` if the dataset has no such column
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.values[i].as_str())
    }

    /// Cell values in column order
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// `(column, value)` pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
    }
}

/// Ordered rows of one platform's sheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<RowRecord>,
}

impl Dataset {
    /// Convert a sheet using its first row as the header
    ///
    /// Empty header cells become `__EMPTY`, `__EMPTY_1`, ...; repeated names
    /// get the first free `_1`, `_2` suffix. Rows with no value at all are
    /// skipped, and missing cells become empty strings.
    pub fn from_sheet(sheet: &Sheet) -> Self {
        let mut grid = sheet.rows.iter();
        let Some(header) = grid.next() else {
            return Self::default();
        };

        let columns = header_names(header);
        let shared: Arc<[String]> = columns.clone().into();

        let rows = grid
            .filter(|row| row.iter().any(|cell| !cell.is_empty()))
            .map(|row| RowRecord {
                columns: Arc::clone(&shared),
                values: (0..shared.len())
                    .map(|i| row.get(i).cloned().unwrap_or_default())
                    .collect(),
            })
            .collect();

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[RowRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn header_names(header: &[String]) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut next_suffix: HashMap<String, usize> = HashMap::new();
    header
        .iter()
        .map(|raw| {
            let base = if raw.is_empty() {
                EMPTY_HEADER.to_string()
            } else {
                raw.clone()
            };
            let mut name = base.clone();
            if taken.contains(&name) {
                // Suffix until free; an earlier header may already own `base_n`
                let counter = next_suffix.entry(base.clone()).or_insert(1);
                loop {
                    name = format!("{}_{}", base, counter);
                    *counter += 1;
                    if !taken.contains(&name) {
                        break;
                    }
                }
            }
            taken.insert(name.clone());
            name
        })
        .collect()
}

/// How one platform's dataset load ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetOutcome {
    /// Parsed and published
    Loaded { rows: usize },
    /// Transport answered with a non-success status
    Unavailable { status: u16 },
    /// Workbook has no sheets
    NoSheets,
    /// Fetch or parse failed
    Failed(String),
    /// Parsed, but a newer attempt for the same platform had started
    Superseded,
}

enum Retrieved {
    Parsed(Dataset),
    Unavailable(u16),
    NoSheets,
}

/// Fetches and parses every platform's workbook
pub struct DatasetLoader {
    catalog: Arc<ResourceCatalog>,
    fetcher: Arc<dyn ResourceFetcher>,
    parser: Arc<dyn WorkbookParser>,
    store: Arc<PlatformStore>,
}

impl DatasetLoader {
    pub fn new(
        catalog: Arc<ResourceCatalog>,
        fetcher: Arc<dyn ResourceFetcher>,
        parser: Arc<dyn WorkbookParser>,
        store: Arc<PlatformStore>,
    ) -> Self {
        Self {
            catalog,
            fetcher,
            parser,
            store,
        }
    }

    /// Load all platforms concurrently
    ///
    /// Returns once every platform has settled. Failures are isolated per
    /// platform and reported in the outcome list, never propagated.
    pub async fn load_all(&self) -> Vec<(Platform, DatasetOutcome)> {
        let loads = Platform::ALL
            .into_iter()
            .map(|platform| async move { (platform, self.load_platform(platform).await) });

        join_all(loads).await
    }

    /// Load one platform, replacing its dataset on success
    pub async fn load_platform(&self, platform: Platform) -> DatasetOutcome {
        let locator = self.catalog.locator(platform, ResourceKind::Dataset);
        let attempt = self.store.begin_dataset_attempt(platform).await;

        let outcome = match self.retrieve(locator).await {
            Ok(Retrieved::Parsed(dataset)) => {
                let rows = dataset.len();
                if self.store.publish_dataset(attempt, dataset).await {
                    info!(platform = %platform, locator, rows, "Dataset loaded");
                    DatasetOutcome::Loaded { rows }
                } else {
                    debug!(platform = %platform, locator, "Dataset discarded, newer attempt in flight");
                    DatasetOutcome::Superseded
                }
            }
            Ok(Retrieved::Unavailable(status)) => {
                warn!(platform = %platform, locator, status, "Could not fetch dataset");
                DatasetOutcome::Unavailable { status }
            }
            Ok(Retrieved::NoSheets) => {
                warn!(platform = %platform, locator, "Workbook has no sheets");
                DatasetOutcome::NoSheets
            }
            Err(e) => {
                error!(platform = %platform, locator, error = %e, "Error loading dataset");
                DatasetOutcome::Failed(e.to_string())
            }
        };

        self.store.finish_dataset_attempt(attempt).await;
        outcome
    }

    async fn retrieve(&self, locator: &str) -> Result<Retrieved> {
        let response = self.fetcher.fetch(locator).await?;
        if !response.is_success() {
            return Ok(Retrieved::Unavailable(response.status()));
        }

        Ok(match self.parser.first_sheet(response.bytes())? {
            Some(sheet) => Retrieved::Parsed(Dataset::from_sheet(&sheet)),
            None => Retrieved::NoSheets,
        })
    }
}
