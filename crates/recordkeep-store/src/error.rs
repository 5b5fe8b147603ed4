//! Error types for the store module.

use std::path::PathBuf;

use recordkeep_core::{CoreError, ValidationError};
use thiserror::Error;

/// Errors that can occur during store operations.
///
/// "Not found" is never an error here: lookups return `Option`, and
/// `update`/`delete` return `bool`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A record failed the collection's validator.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The data file exists but is not a valid document.
    #[error("corrupt data file {}: {reason}", path.display())]
    Corruption { path: PathBuf, reason: String },

    /// File system failure while reading or writing the data file.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Encoding the document failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A caller-supplied identifier was rejected.
    #[error("{0}")]
    InvalidId(#[from] CoreError),

    /// No collection registered under this name.
    #[error("unknown collection: {0}")]
    UnknownCollection(String),
}

impl StoreError {
    /// Whether this is a corrupt-file error (caller may reset to defaults).
    pub fn is_corruption(&self) -> bool {
        matches!(self, StoreError::Corruption { .. })
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
