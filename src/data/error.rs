//! Error types for the data layer.
//!
//! A single numeric cell that fails to parse is never an error: the point is
//! skipped. A cancelled load is an outcome, not an error.

use thiserror::Error;

/// Errors that can occur while reading or loading a source file.
#[derive(Error, Debug)]
pub enum DataError {
    /// The file could not be opened or read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The header line is empty or yields no columns.
    #[error("Format error: {0}")]
    Format(String),

    /// The CSV reader failed for a reason other than I/O.
    #[error("CSV error: {0}")]
    Csv(String),

    /// A load was requested without any selected column.
    #[error("No columns selected")]
    NoSelection,

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for data operations
pub type DataResult<T> = Result<T, DataError>;

impl From<csv::Error> for DataError {
    fn from(error: csv::Error) -> Self {
        let message = error.to_string();
        match error.into_kind() {
            csv::ErrorKind::Io(io_err) => DataError::Io(io_err),
            _ => DataError::Csv(message),
        }
    }
}
