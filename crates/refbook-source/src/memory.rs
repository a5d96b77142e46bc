//! In-memory tables

use std::collections::HashMap;

use serde_json::Value;

use crate::error::SourceError;
use crate::source::{rows_from_value, Row, RowSink, TableSource};

/// Named tables held in memory
///
/// Useful for embedding fixed datasets and for tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    tables: HashMap<String, Vec<Row>>,
}

impl MemorySource {
    /// Create empty source
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a table of rows
    #[must_use]
    pub fn with_table(mut self, table: impl Into<String>, rows: Vec<Row>) -> Self {
        self.insert_table(table, rows);
        self
    }

    /// With a table given as JSON text (an array of objects)
    ///
    /// # Errors
    /// Returns [`SourceError::Malformed`] if the text is not an array of
    /// objects
    pub fn with_json_table(mut self, table: &str, json: &str) -> Result<Self, SourceError> {
        let value: Value = serde_json::from_str(json).map_err(|e| SourceError::Malformed {
            table: table.to_string(),
            message: e.to_string(),
        })?;
        let rows = rows_from_value(table, value)?;
        self.insert_table(table, rows);
        Ok(self)
    }

    /// Insert or replace a table
    pub fn insert_table(&mut self, table: impl Into<String>, rows: Vec<Row>) {
        self.tables.insert(table.into(), rows);
    }

    /// Check if a table exists
    #[inline]
    #[must_use]
    pub fn contains(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }
}

impl TableSource for MemorySource {
    fn stream_rows(&self, table: &str, sink: &mut RowSink<'_>) -> Result<(), SourceError> {
        let rows = self
            .tables
            .get(table)
            .ok_or_else(|| SourceError::TableNotFound(table.to_string()))?;

        for row in rows {
            sink(row.clone())?;
        }
        tracing::debug!("Streamed {} rows from memory table '{}'", rows.len(), table);
        Ok(())
    }
}
