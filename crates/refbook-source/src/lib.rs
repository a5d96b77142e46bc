//! refbook tabular sources
//!
//! The data-source boundary of reference books: a [`TableSource`] streams
//! every row of a named table to a callback that may fail and abort the
//! stream.
//!
//! - [`MemorySource`]: tables held in memory
//! - [`JsonDirSource`]: one `<table>.json` file per table
//!
//! # Example
//!
//! ```rust
//! use refbook_source::{MemorySource, TableSource};
//!
//! let source = MemorySource::new()
//!     .with_json_table("statuses", r#"[{"id":1,"name":"Active"}]"#)
//!     .unwrap();
//!
//! let mut count = 0;
//! source.stream_rows("statuses", &mut |_row| {
//!     count += 1;
//!     Ok(())
//! }).unwrap();
//! assert_eq!(count, 1);
//! ```

#![warn(unreachable_pub)]

mod dir;
mod error;
mod memory;
mod source;

pub use dir::JsonDirSource;
pub use error::SourceError;
pub use memory::MemorySource;
pub use source::{Row, RowSink, TableSource};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
