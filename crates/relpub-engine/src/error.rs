//! Error types for the synchronization engine.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can abort an engine run or a single resolution.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A required path does not exist. Fatal when it affects the
    /// application artifact; resource-level callers degrade it to a
    /// warning instead.
    #[error("not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// No primary variant artifact could be resolved at all.
    #[error("no primary variant artifacts available")]
    NoVariants,

    /// A compressed bundle exists without its decompressed counterpart.
    /// Never fatal: the resource is omitted from the run.
    #[error("bundle {name}: decompressed counterpart {} is missing", counterpart.display())]
    PolicyAmbiguity { name: String, counterpart: PathBuf },

    /// A resource reached the builder without its payload digest.
    #[error("resource {name} is missing its payload digest")]
    MissingDigest { name: String },

    /// Core data-model error (digest/token/manifest parse or encode).
    #[error(transparent)]
    Core(#[from] relpub_core::CoreError),

    /// I/O failure while reading a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
