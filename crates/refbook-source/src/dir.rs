//! Directory of JSON table files
//!
//! Table `customer_types` lives in `<root>/customer_types.json` and holds a
//! JSON array of objects.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::SourceError;
use crate::source::{rows_from_value, RowSink, TableSource};

/// Tables stored as `<table>.json` files under a root directory
#[derive(Debug, Clone)]
pub struct JsonDirSource {
    root: PathBuf,
}

impl JsonDirSource {
    /// Create source rooted at `root`
    #[inline]
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing `table`
    #[must_use]
    pub fn table_path(&self, table: &str) -> PathBuf {
        self.root.join(format!("{table}.json"))
    }
}

impl TableSource for JsonDirSource {
    fn stream_rows(&self, table: &str, sink: &mut RowSink<'_>) -> Result<(), SourceError> {
        // Table names are file stems; anything path-like is not a table.
        if table.is_empty() || table.contains(['/', '\\']) || table.starts_with('.') {
            return Err(SourceError::TableNotFound(table.to_string()));
        }

        let path = self.table_path(table);
        let data = match std::fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SourceError::TableNotFound(table.to_string()));
            }
            Err(e) => return Err(SourceError::io_error(path, e)),
        };

        let value: Value = serde_json::from_slice(&data).map_err(|e| SourceError::Malformed {
            table: table.to_string(),
            message: e.to_string(),
        })?;
        let rows = rows_from_value(table, value)?;
        let count = rows.len();
        for row in rows {
            sink(row)?;
        }
        tracing::debug!("Streamed {} rows from {}", count, path.display());
        Ok(())
    }
}
