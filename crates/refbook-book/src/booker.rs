//! Book-kind capability traits
//!
//! A shelf stores books of any item type through these object-safe traits.

use std::sync::Arc;

use refbook_core::{
    ContentHash, HasKey, HasLocalizedName, HasName, Key, LanguageIndex,
};
use refbook_source::TableSource;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::BookError;

/// Bounds every single-language item type satisfies
pub trait SingleLangItem:
    HasKey + HasName + Serialize + DeserializeOwned + Clone + Send + Sync + 'static
{
}
impl<T> SingleLangItem for T where
    T: HasKey + HasName + Serialize + DeserializeOwned + Clone + Send + Sync + 'static
{
}

/// Bounds every multi-language item type satisfies
pub trait MultiLangItem:
    HasKey + HasLocalizedName + Serialize + DeserializeOwned + Clone + Send + Sync + 'static
{
}
impl<T> MultiLangItem for T where
    T: HasKey + HasLocalizedName + Serialize + DeserializeOwned + Clone + Send + Sync + 'static
{
}

/// Build lifecycle of a book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum BookState {
    /// Nothing loaded or compiled yet
    #[default]
    Empty = 0,
    /// Staged items differ from the published snapshot
    Loaded = 1,
    /// Published snapshot reflects the staged items
    Compiled = 2,
}

/// Operations common to both book kinds
pub trait Booker: Send + Sync {
    /// Rebuild the published snapshot from the staged items
    ///
    /// # Errors
    /// Returns the first build failure; the previous snapshot stays published
    fn compile(&self) -> Result<(), BookError>;

    /// Replace items with a decoded JSON array and compile
    ///
    /// # Errors
    /// Returns [`BookError::Decode`] on malformed input, or a build failure
    fn parse(&self, data: &[u8]) -> Result<(), BookError>;

    /// Replace items with every row of the configured table and compile
    ///
    /// # Errors
    /// Returns [`BookError::MissingTable`] without a table, or the source or
    /// build failure
    fn load_from_source(&self, source: &dyn TableSource) -> Result<(), BookError>;

    /// Hash of the published snapshot
    fn hash(&self) -> ContentHash;

    /// Check if the published snapshot holds `key`
    fn exists(&self, key: Key) -> bool;

    /// Number of published items
    fn len(&self) -> usize;

    /// Check if the published snapshot is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lifecycle state
    fn state(&self) -> BookState;

    /// Name used in logs
    fn label(&self) -> &str;
}

/// Single-language book seen through its exports
pub trait SingleLangBooker: Booker {
    /// JSON array of items
    fn json(&self) -> Arc<[u8]>;

    /// `{"items": [...], "hash": "..."}`
    fn json_with_hash(&self) -> Arc<[u8]>;

    /// Display text of `key`, `""` when absent
    fn text(&self, key: Key) -> String;
}

/// Multi-language book seen through its per-language exports
pub trait MultiLangBooker: Booker {
    /// JSON array for `lang`, `None` if that language was never rendered
    fn json(&self, lang: LanguageIndex) -> Option<Arc<[u8]>>;

    /// Envelope for `lang`, `None` if that language was never rendered
    fn json_with_hash(&self, lang: LanguageIndex) -> Option<Arc<[u8]>>;

    /// Text of `key` in `lang`, `""` when absent or untranslated
    fn text(&self, key: Key, lang: LanguageIndex) -> String;
}
