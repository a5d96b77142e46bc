//! Error types for tabular sources

use std::path::PathBuf;

/// Errors raised while streaming rows out of a source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Table does not exist in the source
    #[error("table not found: '{0}'")]
    TableNotFound(String),

    /// IO error reading the backing file
    #[error("io error reading {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Table content is not an array of objects
    #[error("malformed table '{table}': {message}")]
    Malformed {
        /// Table name
        table: String,
        /// What was wrong
        message: String,
    },

    /// A row could not be turned into an item
    #[error("row {row} of table '{table}' rejected: {message}")]
    Row {
        /// Table name
        table: String,
        /// Zero-based row position
        row: usize,
        /// Why the row was rejected
        message: String,
    },

    /// The row callback stopped the stream
    #[error("stream aborted: {0}")]
    Aborted(String),
}

impl SourceError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create row rejection error
    pub fn row(table: impl Into<String>, row: usize, message: impl ToString) -> Self {
        Self::Row {
            table: table.into(),
            row,
            message: message.to_string(),
        }
    }

    /// Check if a retry could succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}
