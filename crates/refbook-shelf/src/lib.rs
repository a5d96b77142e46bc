//! refbook shelves
//!
//! A [`Shelf`] aggregates named books of both kinds, compiles them together
//! and publishes a total hash plus a [`Manifest`] of per-book hashes, so
//! clients can detect which reference tables changed without downloading
//! them.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use refbook_book::SingleLangBook;
//! use refbook_core::{BookOptions, HasKey, HasName};
//! use refbook_shelf::Shelf;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Clone, Serialize, Deserialize)]
//! struct Status {
//!     id: i64,
//!     name: String,
//! }
//!
//! impl HasKey for Status {
//!     fn key(&self) -> i64 {
//!         self.id
//!     }
//! }
//!
//! impl HasName for Status {
//!     fn name(&self) -> &str {
//!         &self.name
//!     }
//! }
//!
//! let statuses = Arc::new(SingleLangBook::<Status>::new(BookOptions::new()));
//! statuses.parse(br#"[{"id":1,"name":"Active"}]"#).unwrap();
//!
//! let shelf = Shelf::new();
//! shelf.register_single_lang("statuses", statuses);
//! shelf.compile().unwrap();
//!
//! let manifest = shelf.manifest_entries();
//! assert!(manifest.get("statuses").is_some());
//! assert!(!shelf.total_hash().is_zero());
//! ```

#![warn(unreachable_pub)]

mod error;
mod manifest;
mod shelf;

pub use error::ShelfError;
pub use manifest::Manifest;
pub use shelf::{BookKind, Shelf};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
