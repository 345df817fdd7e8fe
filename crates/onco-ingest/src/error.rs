//! Error types for table ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading assessment and intervention tables.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// CSV file not found.
    #[error("CSV file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to open or read the file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === CSV Parsing Errors ===
    /// Malformed CSV record.
    #[error("failed to parse CSV {path}: {source}")]
    CsvParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// CSV file has no header row.
    #[error("CSV file is empty: {path}")]
    EmptyCsv { path: PathBuf },

    // === Table Shape Errors ===
    /// The requested subject identifier column is not in the header.
    #[error("subject column '{column}' not found in {path}")]
    MissingIdColumn { column: String, path: PathBuf },

    /// The header has no visit columns besides the subject identifier.
    #[error("no visit columns in {path}")]
    NoVisitColumns { path: PathBuf },

    /// A data row has an empty subject identifier.
    #[error("row {row} of {path} has no subject identifier")]
    MissingSubjectId { row: usize, path: PathBuf },
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
