//! Error types for book builds
//!
//! Every variant aborts the build in progress. The previously published
//! snapshot, if any, stays in place.

use refbook_core::{HashError, Key};
use refbook_source::SourceError;

/// Errors raised by parse, load and compile
#[derive(Debug, thiserror::Error)]
pub enum BookError {
    /// Input bytes are not a JSON array of items
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),

    /// A source load was attempted without a configured table
    #[error("table name is not specified")]
    MissingTable,

    /// The tabular source failed while streaming
    #[error("source failed: {0}")]
    Source(#[from] SourceError),

    /// Structural hash could not be computed
    #[error("hashing failed: {0}")]
    Hashing(#[from] HashError),

    /// Marshal or name substitution failed
    #[error("json render failed: {message}")]
    JsonRender {
        /// What failed
        message: String,
    },

    /// Two items share a key under the strict policy
    #[error("duplicate key: {key}")]
    DuplicateKey {
        /// The repeated key
        key: Key,
    },
}

impl BookError {
    /// Create render error
    pub fn render(message: impl ToString) -> Self {
        Self::JsonRender {
            message: message.to_string(),
        }
    }

    /// Misconfiguration that no retry will fix
    #[inline]
    #[must_use]
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::MissingTable)
    }

    /// Check if error is retryable
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Source(e) if e.is_retryable())
    }

    /// HTTP status class to report when exposed over a service boundary
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Decode(_) | Self::DuplicateKey { .. } => 400,
            Self::Source(_) => 502,
            Self::MissingTable | Self::Hashing(_) | Self::JsonRender { .. } => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_table_is_critical_server_error() {
        let err = BookError::MissingTable;
        assert!(err.is_critical());
        assert!(!err.is_retryable());
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn decode_is_client_error() {
        let err = BookError::Decode(serde_json::from_str::<Vec<i32>>("[").unwrap_err());
        assert!(!err.is_critical());
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn io_source_error_is_retryable() {
        let io = std::io::Error::new(std::io::ErrorKind::Interrupted, "flaky");
        let err = BookError::from(SourceError::io_error("/data/t.json", io));
        assert!(err.is_retryable());
        assert_eq!(err.status_code(), 502);

        let err = BookError::from(SourceError::TableNotFound("t".into()));
        assert!(!err.is_retryable());
    }
}
