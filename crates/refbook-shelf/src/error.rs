//! Error types for shelf operations

use refbook_book::BookError;

/// Errors raised by shelf compile and load
#[derive(Debug, thiserror::Error)]
pub enum ShelfError {
    /// A member book failed; members before it may already hold fresh state
    #[error("book '{name}' failed: {source}")]
    Book {
        /// Registered name of the failing book
        name: String,
        /// Underlying failure
        #[source]
        source: BookError,
    },

    /// Manifest could not be serialized
    #[error("manifest render failed: {message}")]
    JsonRender {
        /// What failed
        message: String,
    },
}

impl ShelfError {
    pub(crate) fn book(name: &str, source: BookError) -> Self {
        Self::Book {
            name: name.to_string(),
            source,
        }
    }

    /// Name of the failing member, if a member failed
    #[must_use]
    pub fn book_name(&self) -> Option<&str> {
        match self {
            Self::Book { name, .. } => Some(name),
            Self::JsonRender { .. } => None,
        }
    }

    /// Misconfiguration that no retry will fix
    #[must_use]
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::Book { source, .. } if source.is_critical())
    }

    /// Check if error is retryable
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Book { source, .. } if source.is_retryable())
    }

    /// HTTP status class to report when exposed over a service boundary
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Book { source, .. } => source.status_code(),
            Self::JsonRender { .. } => 500,
        }
    }
}
