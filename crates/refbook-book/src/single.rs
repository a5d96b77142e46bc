//! Single-language book
//!
//! [`SingleLangBook`] owns a staged item list (writer side) and a published
//! [`SingleLangSnapshot`] (reader side). Every parse, load or compile builds
//! a complete new snapshot off to the side and publishes it with one atomic
//! pointer swap, so readers see either the old state or the new one.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use refbook_core::{BookOptions, ContentHash, HasKey, HasName, Key};
use refbook_source::TableSource;

use crate::booker::{BookState, Booker, SingleLangBooker, SingleLangItem};
use crate::compile::{
    build_index, load_items, render_envelope, render_json, sort_items, Staging, StateCell,
};
use crate::error::BookError;

/// Immutable compiled state of a [`SingleLangBook`]
#[derive(Debug)]
pub struct SingleLangSnapshot<T> {
    items: Vec<T>,
    index: HashMap<Key, usize>,
    hash: ContentHash,
    json: Arc<[u8]>,
    json_with_hash: Arc<[u8]>,
}

impl<T> SingleLangSnapshot<T> {
    fn empty() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
            hash: ContentHash::default(),
            json: Arc::from(Vec::new()),
            json_with_hash: Arc::from(Vec::new()),
        }
    }

    /// Items in compiled order
    #[inline]
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Item indexed under `key`
    #[must_use]
    pub fn get(&self, key: Key) -> Option<&T> {
        self.index.get(&key).map(|&pos| &self.items[pos])
    }

    /// Check if `key` is indexed
    #[inline]
    #[must_use]
    pub fn contains(&self, key: Key) -> bool {
        self.index.contains_key(&key)
    }

    /// Content hash, zero before the first compile
    #[inline]
    #[must_use]
    pub fn hash(&self) -> ContentHash {
        self.hash
    }

    /// JSON array export, empty before the first compile
    #[inline]
    #[must_use]
    pub fn json(&self) -> &Arc<[u8]> {
        &self.json
    }

    /// JSON envelope with hash, empty before the first compile
    #[inline]
    #[must_use]
    pub fn json_with_hash(&self) -> &Arc<[u8]> {
        &self.json_with_hash
    }

    /// Number of items
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if there are no items
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Reference book whose items carry a single display text
///
/// # Example
///
/// ```rust,ignore
/// let book = SingleLangBook::<CustomerType>::new(BookOptions::new().with_name_sorting());
/// book.parse(br#"[{"id":1,"name":"Individual","isIndividual":true}]"#)?;
/// assert_eq!(book.text(1), "Individual");
/// ```
pub struct SingleLangBook<T: SingleLangItem> {
    options: BookOptions,
    staging: Mutex<Staging<T>>,
    state: StateCell,
    current: ArcSwap<SingleLangSnapshot<T>>,
}

impl<T: SingleLangItem> SingleLangBook<T> {
    /// Create empty book
    #[must_use]
    pub fn new(options: BookOptions) -> Self {
        Self {
            options,
            staging: Mutex::new(Staging::default()),
            state: StateCell::default(),
            current: ArcSwap::from_pointee(SingleLangSnapshot::empty()),
        }
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn options(&self) -> &BookOptions {
        &self.options
    }

    /// Replace items with a decoded JSON array and compile
    ///
    /// # Errors
    /// Returns [`BookError::Decode`] if `data` is not an array of `T`, or a
    /// build failure
    pub fn parse(&self, data: &[u8]) -> Result<(), BookError> {
        let items: Vec<T> = serde_json::from_slice(data).map_err(BookError::Decode)?;
        self.set_items(items)
    }

    /// Replace items with every row of the configured table and compile
    ///
    /// # Errors
    /// Returns [`BookError::MissingTable`] if no table is configured, the
    /// source failure, or a build failure
    pub fn load_from_source(&self, source: &dyn TableSource) -> Result<(), BookError> {
        let Some(table) = self.options.table.as_deref() else {
            tracing::error!("Book '{}': load requested without a table", self.label());
            return Err(BookError::MissingTable);
        };
        let items = load_items(source, table)?;
        self.set_items(items)
    }

    /// Replace items and compile
    ///
    /// # Errors
    /// Returns a build failure; nothing changes in that case
    pub fn set_items(&self, items: Vec<T>) -> Result<(), BookError> {
        let mut staging = self.staging.lock();
        self.publish(&mut staging, items)
    }

    /// Rebuild from the staged items
    ///
    /// # Errors
    /// Returns a build failure; the previous snapshot stays published
    pub fn compile(&self) -> Result<(), BookError> {
        let mut staging = self.staging.lock();
        let items = staging.items.clone();
        self.publish(&mut staging, items)
    }

    fn publish(&self, staging: &mut Staging<T>, items: Vec<T>) -> Result<(), BookError> {
        let snapshot = self.build(items)?;
        staging.items = snapshot.items.clone();
        self.current.store(Arc::new(snapshot));
        self.state.set(BookState::Compiled);
        Ok(())
    }

    fn build(&self, mut items: Vec<T>) -> Result<SingleLangSnapshot<T>, BookError> {
        sort_items(
            &mut items,
            self.options.sort_method,
            |item: &T| item.key(),
            |item: &T| item.name(),
        );
        let index = build_index(&items, self.options.duplicate_policy, self.label())?;
        let json = render_json(&items)?;
        let hash = ContentHash::of_structure(&items)?;
        let json_with_hash = render_envelope(&json, &hash)?;

        tracing::debug!(
            "Compiled book '{}': {} items, hash {}",
            self.label(),
            items.len(),
            hash.short()
        );

        Ok(SingleLangSnapshot {
            items,
            index,
            hash,
            json: Arc::from(json),
            json_with_hash: Arc::from(json_with_hash),
        })
    }

    /// Mutate the staged item under `key`
    ///
    /// The change is not visible to readers, and hash/JSON do not reflect
    /// it, until the next [`compile`](Self::compile).
    pub fn update_item(&self, key: Key, f: impl FnOnce(&mut T)) -> bool {
        let mut staging = self.staging.lock();
        let found = staging.update(key, f);
        if found {
            self.state.set(BookState::Loaded);
        }
        found
    }

    /// Mutate every staged item; visible after the next compile
    pub fn update_all(&self, f: impl FnMut(&mut T)) {
        let mut staging = self.staging.lock();
        staging.update_all(f);
        self.state.set(BookState::Loaded);
    }

    /// Lifecycle state; never waits on a running compile
    #[must_use]
    pub fn state(&self) -> BookState {
        self.state.get()
    }

    /// Pin the published snapshot
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> Arc<SingleLangSnapshot<T>> {
        self.current.load_full()
    }

    /// Copy of the item under `key`
    #[must_use]
    pub fn item(&self, key: Key) -> Option<T> {
        self.current.load().get(key).cloned()
    }

    /// Call `f` with the item under `key`
    pub fn with_item<R>(&self, key: Key, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.snapshot().get(key).map(f)
    }

    /// Check if `key` exists
    #[inline]
    #[must_use]
    pub fn exists(&self, key: Key) -> bool {
        self.current.load().contains(key)
    }

    /// Display text of `key`, `""` when absent
    #[must_use]
    pub fn text(&self, key: Key) -> String {
        self.text_or(key, "")
    }

    /// Display text of `key`, `fallback` when absent
    #[must_use]
    pub fn text_or(&self, key: Key, fallback: &str) -> String {
        self.current
            .load()
            .get(key)
            .map_or(fallback, HasName::name)
            .to_string()
    }

    /// Visit every item in compiled order
    pub fn traverse(&self, mut f: impl FnMut(&T)) {
        let snapshot = self.snapshot();
        for item in snapshot.items() {
            f(item);
        }
    }

    /// Visit items until `f` returns `true`; reports whether it stopped early
    pub fn traverse_until(&self, f: impl FnMut(&T) -> bool) -> bool {
        let snapshot = self.snapshot();
        snapshot.items().iter().any(f)
    }

    /// JSON array export
    #[must_use]
    pub fn json(&self) -> Arc<[u8]> {
        Arc::clone(self.current.load().json())
    }

    /// `{"items": [...], "hash": "..."}`
    #[must_use]
    pub fn json_with_hash(&self) -> Arc<[u8]> {
        Arc::clone(self.current.load().json_with_hash())
    }

    /// Content hash of the published snapshot
    #[must_use]
    pub fn hash(&self) -> ContentHash {
        self.current.load().hash()
    }

    /// Number of published items
    #[must_use]
    pub fn len(&self) -> usize {
        self.current.load().len()
    }

    /// Check if the published snapshot is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.current.load().is_empty()
    }

    /// Name used in logs
    #[must_use]
    pub fn label(&self) -> &str {
        self.options.display_name()
    }
}

impl<T: SingleLangItem> Default for SingleLangBook<T> {
    fn default() -> Self {
        Self::new(BookOptions::default())
    }
}

impl<T: SingleLangItem> std::fmt::Debug for SingleLangBook<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleLangBook")
            .field("label", &self.label())
            .field("len", &self.len())
            .field("hash", &self.hash().short())
            .finish_non_exhaustive()
    }
}

impl<T: SingleLangItem> Booker for SingleLangBook<T> {
    fn compile(&self) -> Result<(), BookError> {
        SingleLangBook::compile(self)
    }

    fn parse(&self, data: &[u8]) -> Result<(), BookError> {
        SingleLangBook::parse(self, data)
    }

    fn load_from_source(&self, source: &dyn TableSource) -> Result<(), BookError> {
        SingleLangBook::load_from_source(self, source)
    }

    fn hash(&self) -> ContentHash {
        SingleLangBook::hash(self)
    }

    fn exists(&self, key: Key) -> bool {
        SingleLangBook::exists(self, key)
    }

    fn len(&self) -> usize {
        SingleLangBook::len(self)
    }

    fn state(&self) -> BookState {
        SingleLangBook::state(self)
    }

    fn label(&self) -> &str {
        SingleLangBook::label(self)
    }
}

impl<T: SingleLangItem> SingleLangBooker for SingleLangBook<T> {
    fn json(&self) -> Arc<[u8]> {
        SingleLangBook::json(self)
    }

    fn json_with_hash(&self) -> Arc<[u8]> {
        SingleLangBook::json_with_hash(self)
    }

    fn text(&self, key: Key) -> String {
        SingleLangBook::text(self, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use refbook_source::MemorySource;
    use refbook_test_utils::{CustomerType, CUSTOMER_TYPES_JSON};
    use serde_json::Value;

    fn names(json: &[u8]) -> Vec<String> {
        let value: Value = serde_json::from_slice(json).unwrap();
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["name"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn parse_and_lookup() {
        let book = SingleLangBook::<CustomerType>::new(BookOptions::new().with_name_sorting());
        book.parse(CUSTOMER_TYPES_JSON.as_bytes()).unwrap();

        assert_eq!(book.text(1), "Individual");
        assert_eq!(book.text(3), "");
        assert_eq!(book.text_or(3, "unknown"), "unknown");
        assert!(book.exists(2));
        assert!(!book.exists(3));
        assert_eq!(book.item(2).unwrap().name, "Legal entity");
        assert_eq!(names(&book.json()), vec!["Individual", "Legal entity"]);
        assert_eq!(book.state(), BookState::Compiled);
    }

    #[test]
    fn empty_before_first_compile() {
        let book = SingleLangBook::<CustomerType>::default();
        assert_eq!(book.state(), BookState::Empty);
        assert!(book.hash().is_zero());
        assert!(book.json().is_empty());
        assert!(book.json_with_hash().is_empty());
        assert!(book.is_empty());
    }

    #[test]
    fn envelope_carries_items_and_string_hash() {
        let book = SingleLangBook::<CustomerType>::default();
        book.parse(CUSTOMER_TYPES_JSON.as_bytes()).unwrap();

        let env: Value = serde_json::from_slice(&book.json_with_hash()).unwrap();
        assert_eq!(env["hash"], Value::String(book.hash().to_string()));
        let items: Value = serde_json::from_slice(&book.json()).unwrap();
        assert_eq!(env["items"], items);
    }

    #[test]
    fn key_sorting_orders_by_key() {
        let book = SingleLangBook::<CustomerType>::new(BookOptions::new().with_key_sorting());
        book.parse(br#"[{"id":3,"name":"a","isIndividual":true},{"id":1,"name":"z","isIndividual":true}]"#)
            .unwrap();
        let mut keys = Vec::new();
        book.traverse(|c| keys.push(c.id));
        assert_eq!(keys, vec![1, 3]);
    }

    #[test]
    fn malformed_parse_keeps_previous_snapshot() {
        let book = SingleLangBook::<CustomerType>::default();
        book.parse(CUSTOMER_TYPES_JSON.as_bytes()).unwrap();
        let before = book.hash();

        let err = book.parse(b"[{\"id\":1,").unwrap_err();
        assert!(matches!(err, BookError::Decode(_)));
        assert_eq!(book.hash(), before);
        assert_eq!(book.text(1), "Individual");
    }

    #[test]
    fn load_without_table_is_configuration_error() {
        let book = SingleLangBook::<CustomerType>::default();
        let source = MemorySource::new();
        let err = book.load_from_source(&source).unwrap_err();
        assert!(matches!(err, BookError::MissingTable));
        assert!(err.is_critical());
        assert_eq!(book.state(), BookState::Empty);
        assert!(book.hash().is_zero());
    }

    #[test]
    fn load_from_memory_table() {
        let source = MemorySource::new()
            .with_json_table("customer_types", CUSTOMER_TYPES_JSON)
            .unwrap();
        let book = SingleLangBook::<CustomerType>::new(
            BookOptions::new().with_table("customer_types").with_key_sorting(),
        );
        book.load_from_source(&source).unwrap();
        assert_eq!(book.len(), 2);
        assert_eq!(book.text(2), "Legal entity");
    }

    #[test]
    fn state_readable_while_writer_holds_staging() {
        let book = SingleLangBook::<CustomerType>::default();
        book.parse(CUSTOMER_TYPES_JSON.as_bytes()).unwrap();

        // The closure runs under the staging lock
        let mut seen = Vec::new();
        book.update_all(|_| seen.push(book.state()));
        assert_eq!(seen, vec![BookState::Compiled, BookState::Compiled]);
        assert_eq!(book.state(), BookState::Loaded);
    }

    #[test]
    fn update_item_is_invisible_until_compile() {
        let book = SingleLangBook::<CustomerType>::default();
        book.parse(CUSTOMER_TYPES_JSON.as_bytes()).unwrap();
        let before = book.hash();

        assert!(book.update_item(1, |c| c.name = "Person".to_string()));
        assert!(!book.update_item(99, |c| c.name.clear()));
        assert_eq!(book.state(), BookState::Loaded);
        assert_eq!(book.text(1), "Individual");
        assert_eq!(book.hash(), before);

        book.compile().unwrap();
        assert_eq!(book.text(1), "Person");
        assert_ne!(book.hash(), before);
        assert_eq!(book.state(), BookState::Compiled);
    }

    #[test]
    fn traverse_until_stops_early() {
        let book = SingleLangBook::<CustomerType>::new(BookOptions::new().with_key_sorting());
        book.parse(CUSTOMER_TYPES_JSON.as_bytes()).unwrap();

        let mut seen = Vec::new();
        let stopped = book.traverse_until(|c| {
            seen.push(c.id);
            c.id == 1
        });
        assert!(stopped);
        assert_eq!(seen, vec![1]);

        assert!(!book.traverse_until(|_| false));
    }

    #[test]
    fn duplicate_keys_last_write_wins_by_default() {
        let book = SingleLangBook::<CustomerType>::default();
        book.parse(br#"[{"id":1,"name":"old","isIndividual":true},{"id":1,"name":"new","isIndividual":true}]"#)
            .unwrap();
        assert_eq!(book.text(1), "new");
        assert_eq!(book.len(), 2);
    }

    #[test]
    fn duplicate_keys_rejected_when_strict() {
        let book = SingleLangBook::<CustomerType>::new(BookOptions::new().with_strict_keys());
        let err = book
            .parse(br#"[{"id":1,"name":"old","isIndividual":true},{"id":1,"name":"new","isIndividual":true}]"#)
            .unwrap_err();
        assert!(matches!(err, BookError::DuplicateKey { key: 1 }));
        assert_eq!(book.state(), BookState::Empty);
    }

    #[test]
    fn with_item_borrows() {
        let book = SingleLangBook::<CustomerType>::default();
        book.parse(CUSTOMER_TYPES_JSON.as_bytes()).unwrap();
        assert_eq!(book.with_item(1, |c| c.is_individual), Some(true));
        assert_eq!(book.with_item(5, |c| c.is_individual), None);
    }
}
