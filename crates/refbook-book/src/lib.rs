//! refbook books
//!
//! Compiled, versioned collections of reference items.
//!
//! A book loads raw items (JSON bytes or a [`TableSource`](refbook_source::TableSource)),
//! sorts them, indexes them by key, computes a structural [`ContentHash`](refbook_core::ContentHash)
//! and pre-renders JSON exports. Readers always see one complete compiled
//! snapshot; a failed build leaves the previous one published.
//!
//! - [`SingleLangBook`]: one display text per item
//! - [`MultiLangBook`]: display text per language, one export per language
//!
//! # Example
//!
//! ```rust
//! use refbook_book::SingleLangBook;
//! use refbook_core::{BookOptions, HasKey, HasName};
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
//! let book = SingleLangBook::<Status>::new(BookOptions::new().with_name_sorting());
//! book.parse(br#"[{"id":2,"name":"Blocked"},{"id":1,"name":"Active"}]"#).unwrap();
//!
//! assert_eq!(book.text(2), "Blocked");
//! assert_eq!(&*book.json(), br#"[{"id":1,"name":"Active"},{"id":2,"name":"Blocked"}]"#);
//! ```

#![warn(unreachable_pub)]

mod booker;
mod compile;
mod error;
mod multi;
mod single;

pub use booker::{BookState, Booker, MultiLangBooker, MultiLangItem, SingleLangBooker, SingleLangItem};
pub use error::BookError;
pub use multi::{LanguageExport, MultiLangBook, MultiLangSnapshot};
pub use single::{SingleLangBook, SingleLangSnapshot};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
