//! Error types for source collaborators.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by artifact/definition sources and publish sinks.
#[derive(Debug, Error)]
pub enum SourceError {
    /// A required path does not exist.
    #[error("not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// A filename failed to match an expected pattern where one was
    /// required.
    #[error("pattern error: {0}")]
    Pattern(String),

    /// A git subprocess failed.
    #[error("git {op} failed: {stderr}")]
    Git { op: String, stderr: String },

    /// Core data-model error.
    #[error(transparent)]
    Core(#[from] relpub_core::CoreError),

    /// I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for source operations.
pub type Result<T> = std::result::Result<T, SourceError>;
