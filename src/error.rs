//! Custom error types for bibdedup.
//!
//! This module defines all error types used by both pipelines.
//! All functions return `Result<T, DedupError>` instead of using `unwrap()`.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for bibdedup operations.
///
/// Every variant is terminal for the run; nothing is retried.
#[derive(Debug, Error)]
pub enum DedupError {
    /// Input file does not exist
    #[error("input file '{}' not found", .0.display())]
    InputNotFound(PathBuf),

    /// A column the pipeline reads is not in the header row
    #[error("Missing column: '{0}'")]
    MissingColumn(String),

    /// A data row has more fields than the header
    #[error("Malformed row at line {line}: expected {expected} fields, saw {found}")]
    MalformedRow {
        /// 1-based line number in the input
        line: u64,
        expected: usize,
        found: usize,
    },

    /// Output path points at the input file
    #[error("output file '{}' is the input file", .0.display())]
    OutputOverwritesInput(PathBuf),

    /// CSV parsing or writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using `DedupError`
pub type Result<T> = std::result::Result<T, DedupError>;

/// Extension trait for adding context to Option types
pub trait OptionExt<T> {
    /// Convert Option to Result with a missing column error
    fn ok_or_missing_column(self, column: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_missing_column(self, column: &str) -> Result<T> {
        self.ok_or_else(|| DedupError::MissingColumn(column.to_string()))
    }
}
