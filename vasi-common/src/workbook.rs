//! Workbook parsing
//!
//! Only the first sheet of a workbook is ever consumed, so the parser
//! contract is "bytes in, first sheet out". `Ok(None)` means the workbook
//! decoded but contains no sheets at all.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use thiserror::Error;

/// Workbook parsing errors
#[derive(Debug, Error)]
pub enum WorkbookError {
    /// Payload is not a workbook in any supported format
    #[error("Unreadable workbook: {0}")]
    Unreadable(String),

    /// Workbook decoded but the named sheet could not be read
    #[error("Sheet '{0}' could not be read: {1}")]
    Sheet(String, String),
}

/// One sheet as a grid of display strings
///
/// All rows have the same width; blank cells are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

/// Capability to decode a binary workbook
pub trait WorkbookParser: Send + Sync {
    /// Decode `bytes` and return its first sheet, or `None` if it has no sheets
    fn first_sheet(&self, bytes: &[u8]) -> Result<Option<Sheet>, WorkbookError>;
}

/// xlsx / xlsm / xlsb / xls / ods decoding via calamine
#[derive(Debug, Clone, Copy, Default)]
pub struct CalamineParser;

impl WorkbookParser for CalamineParser {
    fn first_sheet(&self, bytes: &[u8]) -> Result<Option<Sheet>, WorkbookError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
            .map_err(|e| WorkbookError::Unreadable(e.to_string()))?;

        let Some(name) = workbook.sheet_names().into_iter().next() else {
            return Ok(None);
        };

        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| WorkbookError::Sheet(name.clone(), e.to_string()))?;

        let rows = range
            .rows()
            .map(|row| row.iter().map(cell_text).collect())
            .collect();

        Ok(Some(Sheet { name, rows }))
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}
