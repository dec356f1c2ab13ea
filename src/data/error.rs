//! Error types for loading and exporting sales data.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a dataset load. A load either yields every row or fails.
#[derive(Debug, Error)]
pub enum LoadError {
    // === File System Errors ===
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file extension: .{extension}")]
    UnsupportedExtension { extension: String },

    // === Shape Errors ===
    #[error("required column '{column}' not found")]
    MissingColumn { column: &'static str },

    #[error("row {row}: missing value in '{column}'")]
    MissingValue { row: usize, column: &'static str },

    #[error("row {row}: invalid date '{value}' in '{column}' (expected day-first, e.g. 31/12/2024)")]
    InvalidDate {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("row {row}: invalid number '{value}' in '{column}'")]
    InvalidNumber {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("JSON row {row}: {reason}")]
    JsonShape { row: usize, reason: String },

    // === Format Errors ===
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("failed to decode arrow batch: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

/// Errors raised while serialising a view to CSV.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write CSV record: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to flush CSV buffer: {0}")]
    Flush(#[source] std::io::Error),
}
