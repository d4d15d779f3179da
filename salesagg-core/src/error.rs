//! Error types for the salesagg pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal pipeline error. Any of these stops the run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Error reading CSV file: {0}")]
    Read(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("SQLite error: {0}")]
    Sink(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn read(msg: impl Into<String>) -> Self {
        Self::Read(msg.into())
    }

    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    pub fn sink(msg: impl Into<String>) -> Self {
        Self::Sink(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Short label for the error kind, used in logs and the run summary.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Read(_) => "read_error",
            Self::Schema(_) => "schema_error",
            Self::Sink(_) => "sink_error",
            Self::Config(_) => "config_error",
            Self::Io(_) => "io_error",
        }
    }
}

impl From<csv::Error> for PipelineError {
    fn from(e: csv::Error) -> Self {
        Self::Read(e.to_string())
    }
}

impl From<rusqlite::Error> for PipelineError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Sink(e.to_string())
    }
}

impl From<figment::Error> for PipelineError {
    fn from(e: figment::Error) -> Self {
        Self::Config(e.to_string())
    }
}

/// A non-fatal, per-row validation failure. Collected, logged and counted.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize)]
#[error("row {row_index}, column '{column}': {reason}")]
pub struct RowValidationError {
    /// Zero-based index of the data row (header excluded).
    pub row_index: usize,
    pub column: String,
    pub reason: String,
}
