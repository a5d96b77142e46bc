//! refbook core
//!
//! Building blocks shared by books and shelves.
//!
//! # Core Concepts
//!
//! - [`HasKey`], [`HasName`], [`HasLocalizedName`]: item capability contracts
//! - [`ContentHash`]: 32-byte BLAKE3 structural hash, hex on the wire
//! - [`LanguageRegistry`]: supported languages and code/index conversion
//! - [`BookOptions`]: sort method, source table, default language
//!
//! # Example
//!
//! ```rust
//! use refbook_core::{ContentHash, HasKey, HasName};
//!
//! #[derive(serde::Serialize)]
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
//! let items = vec![Status { id: 1, name: "Active".into() }];
//! let hash = ContentHash::of_structure(&items).unwrap();
//! assert!(!hash.is_zero());
//! ```

#![warn(unreachable_pub)]

mod contract;
mod hash;
mod language;
mod options;

pub use contract::{HasKey, HasLocalizedName, HasName, Key};
pub use hash::{ContentHash, HashError};
pub use language::{Language, LanguageIndex, LanguageRegistry, LocalizedName, StaticLanguages};
pub use options::{BookOptions, DuplicatePolicy, SortMethod};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
