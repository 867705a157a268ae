//! Column-value filtering over a dataset

use std::collections::HashSet;

use crate::dataset::{Dataset, RowRecord};

/// Columns the viewer offers filter drop-downs for, in display order
pub const FILTER_COLUMNS: [&str; 3] = ["Product", "Release", "Configuration"];

/// Selected value per column; an empty value means "no filter"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnFilters {
    selections: Vec<(String, String)>,
}

impl ColumnFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`ColumnFilters::set`]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(column, value);
        self
    }

    /// Select `value` for `column`, replacing an earlier selection
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        match self.selections.iter_mut().find(|(c, _)| *c == column) {
            Some(existing) => existing.1 = value,
            None => self.selections.push((column, value)),
        }
    }

    /// Selected value for `column`, empty if unset
    pub fn selected(&self, column: &str) -> &str {
        self.selections
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    /// True when no column has a non-empty selection
    pub fn is_unset(&self) -> bool {
        self.selections.iter().all(|(_, v)| v.is_empty())
    }

    /// Row passes when it equals every non-empty selection exactly
    pub fn matches(&self, row: &RowRecord) -> bool {
        self.selections
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .all(|(column, value)| row.get(column) == Some(value.as_str()))
    }
}

/// Rows passing `filters`, in dataset order
pub fn filter_rows<'a>(dataset: &'a Dataset, filters: &ColumnFilters) -> Vec<&'a RowRecord> {
    dataset.rows().iter().filter(|row| filters.matches(row)).collect()
}

/// Distinct non-empty values of `column`, in first-seen order
pub fn unique_values(dataset: &Dataset, column: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    dataset
        .rows()
        .iter()
        .filter_map(|row| row.get(column))
        .filter(|value| !value.is_empty())
        .filter(|value| seen.insert(*value))
        .map(str::to_string)
        .collect()
}
