//! Error types for history store operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while mutating the history document.
///
/// "Entry not found" is deliberately absent: `remove_by_id` reports it as
/// `Ok(None)`.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// The document could not be read (when present) or written.
    #[error("Failed to persist search history at {path}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document exists but is not a JSON array of entries.
    #[error("Search history at {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize search history: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl HistoryError {
    pub(crate) fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persistence {
            path: path.into(),
            source,
        }
    }
}

/// Result type for history store operations.
pub type HistoryResult<T> = Result<T, HistoryError>;
