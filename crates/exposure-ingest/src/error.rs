//! Error types for exposure CSV ingestion and output.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading events/queries or writing rows.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// CSV file not found.
    #[error("CSV file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === CSV Parsing Errors ===
    /// Malformed CSV.
    #[error("failed to parse CSV {path}: {source}")]
    CsvParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// CSV file has no header row.
    #[error("CSV file is empty: {path}")]
    EmptyCsv { path: PathBuf },

    /// Required column not found in the header row.
    #[error("required column '{column}' not found in {path}")]
    MissingColumn { column: String, path: PathBuf },

    // === Value Errors ===
    /// Entity identifier cell is blank.
    #[error("empty {column} in {path} at row {row}")]
    EmptyEntity {
        path: PathBuf,
        row: usize,
        column: String,
    },

    /// Timestamp cell could not be parsed.
    #[error("invalid timestamp '{value}' in column {column} of {path} at row {row}")]
    InvalidTimestamp {
        path: PathBuf,
        row: usize,
        column: String,
        value: String,
    },

    // === Output Errors ===
    /// Failed to write CSV output.
    #[error("failed to write CSV output: {source}")]
    CsvWrite {
        #[source]
        source: csv::Error,
    },

    /// Failed to write JSON output.
    #[error("failed to write JSON output: {source}")]
    JsonWrite {
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
