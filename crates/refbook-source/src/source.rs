//! Tabular source contract

use serde_json::{Map, Value};

use crate::error::SourceError;

/// One row of a table, field name to value
pub type Row = Map<String, Value>;

/// Callback invoked for each streamed row
///
/// Returning an error stops the stream; the source hands that error back
/// to its caller unchanged.
pub type RowSink<'a> = dyn FnMut(Row) -> Result<(), SourceError> + 'a;

/// A backing store that can stream every row of a named table
///
/// Books only ever need "select all"; there is no filtering, paging or
/// write-back.
pub trait TableSource: Send + Sync {
    /// Stream all rows of `table` into `sink`, in storage order
    ///
    /// # Errors
    /// Returns the source's own failure, or the first error returned by
    /// `sink`
    fn stream_rows(&self, table: &str, sink: &mut RowSink<'_>) -> Result<(), SourceError>;
}

/// Convert a JSON array of objects into rows
pub(crate) fn rows_from_value(table: &str, value: Value) -> Result<Vec<Row>, SourceError> {
    let Value::Array(values) = value else {
        return Err(SourceError::Malformed {
            table: table.to_string(),
            message: "expected a JSON array".to_string(),
        });
    };

    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| match v {
            Value::Object(row) => Ok(row),
            other => Err(SourceError::Malformed {
                table: table.to_string(),
                message: format!("element {i} is not an object: {other}"),
            }),
        })
        .collect()
}
