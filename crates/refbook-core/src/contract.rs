//! Item capability contracts
//!
//! A book item is any value type that exposes an integer primary key plus
//! either a single display text ([`HasName`]) or a per-language one
//! ([`HasLocalizedName`]). Books bound their item type on these traits.

use crate::language::Language;

/// Integer primary key of a book item
pub type Key = i64;

/// Exposes the item's primary key
///
/// Uniqueness is not enforced by the contract; books decide what to do with
/// duplicates according to their [`DuplicatePolicy`](crate::DuplicatePolicy).
pub trait HasKey {
    /// Primary key
    fn key(&self) -> Key;
}

/// Single-language display text
pub trait HasName {
    /// Display text
    fn name(&self) -> &str;
}

/// Per-language display text
pub trait HasLocalizedName {
    /// JSON field that receives the flat localized text on export
    const NAME_FIELD: &'static str = "name";

    /// Text in `lang`, or `None` when not translated
    fn localized_name(&self, lang: &Language) -> Option<&str>;
}
