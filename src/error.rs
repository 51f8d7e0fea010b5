//! Error types for the import pipeline.
//!
//! Only setup and sink-level failures are represented here. Per-row problems
//! (unresolvable keys, rejected inserts, malformed numbers) are not errors:
//! they are tallied by the loaders and never escape a phase.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to read or interpret the source dataset.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Source file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Required column '{0}' is missing from the source header")]
    MissingColumn(&'static str),
}

/// Failure reported by a sink.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Insert rejected: {0}")]
    Rejected(String),
}

/// Invalid configuration value.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Error that aborts a pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
