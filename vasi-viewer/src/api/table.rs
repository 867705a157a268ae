//! Table API with column-value filtering
//!
//! Filters arrive as query parameters named after the filter columns, e.g.
//! `?Product=MiVB&Release=10.0`. An empty or absent parameter means "all".

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use vasi_common::filter::{filter_rows, unique_values, ColumnFilters, FILTER_COLUMNS};
use vasi_common::Platform;

use super::ApiError;
use crate::AppState;

/// Drop-down contents for one filter column
#[derive(Debug, Serialize)]
pub struct FilterOptions {
    pub column: String,
    pub selected: String,
    /// Distinct non-empty values over the whole dataset, first-seen order
    pub values: Vec<String>,
}

/// Table data response
#[derive(Debug, Serialize)]
pub struct TableResponse {
    pub platform: Platform,
    pub label: &'static str,
    pub columns: Vec<String>,
    /// Filtered rows, cells in column order
    pub rows: Vec<Vec<String>>,
    pub total_rows: usize,
    pub filtered_rows: usize,
    pub filters: Vec<FilterOptions>,
    /// Message shown instead of the table when the dataset is empty
    pub placeholder: Option<String>,
}

/// GET /api/platforms/:id/table
pub async fn get_platform_table(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<TableResponse>, ApiError> {
    let platform = ApiError::platform(&id)?;
    let (dataset, pending) = state.store.dataset_state(platform).await;

    let mut filters = ColumnFilters::new();
    for column in FILTER_COLUMNS {
        if let Some(value) = params.get(column) {
            filters.set(column, value.as_str());
        }
    }

    let rows: Vec<Vec<String>> = filter_rows(&dataset, &filters)
        .into_iter()
        .map(|row| row.values().to_vec())
        .collect();

    let filter_options = FILTER_COLUMNS
        .into_iter()
        .map(|column| FilterOptions {
            column: column.to_string(),
            selected: filters.selected(column).to_string(),
            values: unique_values(&dataset, column),
        })
        .collect();

    let placeholder = if dataset.is_empty() {
        Some(if pending {
            "Loading data...".to_string()
        } else {
            format!("No data available for {}", platform.label())
        })
    } else {
        None
    };

    Ok(Json(TableResponse {
        platform,
        label: platform.label(),
        columns: dataset.columns().to_vec(),
        filtered_rows: rows.len(),
        total_rows: dataset.len(),
        rows,
        filters: filter_options,
        placeholder,
    }))
}
