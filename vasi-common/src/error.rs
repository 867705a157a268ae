//! Common error types for VASI

use thiserror::Error;

use crate::fetch::FetchError;
use crate::workbook::WorkbookError;

/// Common result type for VASI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the VASI crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Resource could not be retrieved
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Resource was retrieved but is not a readable workbook
    #[error("Workbook error: {0}")]
    Workbook(#[from] WorkbookError),

    /// Identifier does not name one of the known platforms
    #[error("Unknown platform: {0}")]
    UnknownPlatform(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
