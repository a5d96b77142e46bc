//! Multi-language book
//!
//! Like [`SingleLangBook`](crate::SingleLangBook), but items carry display
//! text per language. A compile renders one JSON export per supported
//! language, each sorted by that language's text when name sorting is
//! configured, and all sharing the one content hash computed over the
//! language-independent items.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use rayon::prelude::*;
use refbook_core::{
    BookOptions, ContentHash, HasKey, HasLocalizedName, Key, Language, LanguageIndex,
    LanguageRegistry, SortMethod,
};
use refbook_source::TableSource;

use crate::booker::{BookState, Booker, MultiLangBooker, MultiLangItem};
use crate::compile::{
    build_index, load_items, render_envelope, render_localized, sort_items, Staging, StateCell,
};
use crate::error::BookError;

/// Exports rendered for one language
#[derive(Debug, Clone)]
pub struct LanguageExport {
    language: Language,
    json: Arc<[u8]>,
    json_with_hash: Arc<[u8]>,
}

impl LanguageExport {
    /// Language of this export
    #[inline]
    #[must_use]
    pub fn language(&self) -> &Language {
        &self.language
    }

    /// JSON array with flat names
    #[inline]
    #[must_use]
    pub fn json(&self) -> &Arc<[u8]> {
        &self.json
    }

    /// Envelope with the book hash
    #[inline]
    #[must_use]
    pub fn json_with_hash(&self) -> &Arc<[u8]> {
        &self.json_with_hash
    }
}

/// Immutable compiled state of a [`MultiLangBook`]
#[derive(Debug)]
pub struct MultiLangSnapshot<T> {
    items: Vec<T>,
    index: HashMap<Key, usize>,
    hash: ContentHash,
    exports: HashMap<LanguageIndex, LanguageExport>,
}

impl<T> MultiLangSnapshot<T> {
    fn empty() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
            hash: ContentHash::default(),
            exports: HashMap::new(),
        }
    }

    /// Items in primary order
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

    /// Exports for `lang`, if it was rendered
    #[inline]
    #[must_use]
    pub fn export(&self, lang: LanguageIndex) -> Option<&LanguageExport> {
        self.exports.get(&lang)
    }

    /// Rendered languages, ascending by index
    #[must_use]
    pub fn languages(&self) -> Vec<LanguageIndex> {
        let mut langs: Vec<_> = self.exports.keys().copied().collect();
        langs.sort_unstable();
        langs
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

impl<T: HasLocalizedName> MultiLangSnapshot<T> {
    fn text_in(&self, key: Key, lang: &Language) -> Option<&str> {
        self.get(key)?.localized_name(lang).filter(|s| !s.is_empty())
    }
}

/// Reference book whose items carry per-language display text
pub struct MultiLangBook<T: MultiLangItem> {
    options: BookOptions,
    languages: Arc<dyn LanguageRegistry>,
    staging: Mutex<Staging<T>>,
    state: StateCell,
    current: ArcSwap<MultiLangSnapshot<T>>,
}

impl<T: MultiLangItem> MultiLangBook<T> {
    /// Create empty book rendering the languages `languages` supports
    #[must_use]
    pub fn new(options: BookOptions, languages: Arc<dyn LanguageRegistry>) -> Self {
        Self {
            options,
            languages,
            staging: Mutex::new(Staging::default()),
            state: StateCell::default(),
            current: ArcSwap::from_pointee(MultiLangSnapshot::empty()),
        }
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn options(&self) -> &BookOptions {
        &self.options
    }

    /// Language registry
    #[inline]
    #[must_use]
    pub fn language_registry(&self) -> &Arc<dyn LanguageRegistry> {
        &self.languages
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

    fn build(&self, mut items: Vec<T>) -> Result<MultiLangSnapshot<T>, BookError> {
        let sort_method = self.options.sort_method;

        // Primary order sorts by name only when a default language is set
        let default_lang = self.default_language();
        let primary = match (sort_method, &default_lang) {
            (SortMethod::ByName, None) => SortMethod::None,
            (method, _) => method,
        };
        sort_items(
            &mut items,
            primary,
            |item: &T| item.key(),
            |item: &T| {
                default_lang
                    .as_ref()
                    .and_then(|lang| item.localized_name(lang))
                    .unwrap_or_default()
            },
        );

        let index = build_index(&items, self.options.duplicate_policy, self.label())?;
        let hash = ContentHash::of_structure(&items)?;

        let exports = self
            .languages
            .supported()
            .into_par_iter()
            .map(|lang| {
                let export = render_language(&items, lang, sort_method, &hash)?;
                Ok((export.language.index(), export))
            })
            .collect::<Result<HashMap<_, _>, BookError>>()?;

        tracing::debug!(
            "Compiled book '{}': {} items in {} languages, hash {}",
            self.label(),
            items.len(),
            exports.len(),
            hash.short()
        );

        Ok(MultiLangSnapshot {
            items,
            index,
            hash,
            exports,
        })
    }

    fn default_language(&self) -> Option<Language> {
        self.options
            .default_language
            .and_then(|li| self.languages.language(li))
    }

    fn resolve(&self, snapshot: &MultiLangSnapshot<T>, lang: LanguageIndex) -> Option<Language> {
        match snapshot.export(lang) {
            Some(export) => Some(export.language.clone()),
            None => self.languages.language(lang),
        }
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
    pub fn snapshot(&self) -> Arc<MultiLangSnapshot<T>> {
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

    /// Text of `key` in `lang`, `""` when absent or untranslated
    #[must_use]
    pub fn text(&self, key: Key, lang: LanguageIndex) -> String {
        let snapshot = self.snapshot();
        self.resolve(&snapshot, lang)
            .and_then(|lang| snapshot.text_in(key, &lang).map(str::to_string))
            .unwrap_or_default()
    }

    /// Text of `key` in `primary`, else in `secondary`, else `""`
    #[must_use]
    pub fn text_with_fallback(
        &self,
        key: Key,
        primary: LanguageIndex,
        secondary: LanguageIndex,
    ) -> String {
        let snapshot = self.snapshot();
        [primary, secondary]
            .into_iter()
            .filter_map(|li| self.resolve(&snapshot, li))
            .find_map(|lang| snapshot.text_in(key, &lang).map(str::to_string))
            .unwrap_or_default()
    }

    /// Text of `key` in the default language
    #[must_use]
    pub fn text_default(&self, key: Key) -> String {
        self.options
            .default_language
            .map(|li| self.text(key, li))
            .unwrap_or_default()
    }

    /// Visit every item in primary order
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

    /// JSON array for `lang`, `None` if never rendered
    #[must_use]
    pub fn json(&self, lang: LanguageIndex) -> Option<Arc<[u8]>> {
        self.current.load().export(lang).map(|e| Arc::clone(e.json()))
    }

    /// Envelope for `lang`, `None` if never rendered
    #[must_use]
    pub fn json_with_hash(&self, lang: LanguageIndex) -> Option<Arc<[u8]>> {
        self.current
            .load()
            .export(lang)
            .map(|e| Arc::clone(e.json_with_hash()))
    }

    /// JSON array in the default language
    #[must_use]
    pub fn json_default(&self) -> Option<Arc<[u8]>> {
        self.options.default_language.and_then(|li| self.json(li))
    }

    /// Envelope in the default language
    #[must_use]
    pub fn json_with_hash_default(&self) -> Option<Arc<[u8]>> {
        self.options
            .default_language
            .and_then(|li| self.json_with_hash(li))
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

/// Sort a view of `items` for `lang` and render its exports
fn render_language<T: MultiLangItem>(
    items: &[T],
    lang: Language,
    sort_method: SortMethod,
    hash: &ContentHash,
) -> Result<LanguageExport, BookError> {
    let mut view: Vec<&T> = items.iter().collect();
    sort_items(
        &mut view,
        sort_method,
        |item: &&T| item.key(),
        |item: &&T| item.localized_name(&lang).unwrap_or_default(),
    );

    let json = render_localized(&view, &lang)?;
    let json_with_hash = render_envelope(&json, hash)?;
    Ok(LanguageExport {
        language: lang,
        json: Arc::from(json),
        json_with_hash: Arc::from(json_with_hash),
    })
}

impl<T: MultiLangItem> std::fmt::Debug for MultiLangBook<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiLangBook")
            .field("label", &self.label())
            .field("len", &self.len())
            .field("hash", &self.hash().short())
            .field("languages", &self.languages)
            .finish_non_exhaustive()
    }
}

impl<T: MultiLangItem> Booker for MultiLangBook<T> {
    fn compile(&self) -> Result<(), BookError> {
        MultiLangBook::compile(self)
    }

    fn parse(&self, data: &[u8]) -> Result<(), BookError> {
        MultiLangBook::parse(self, data)
    }

    fn load_from_source(&self, source: &dyn TableSource) -> Result<(), BookError> {
        MultiLangBook::load_from_source(self, source)
    }

    fn hash(&self) -> ContentHash {
        MultiLangBook::hash(self)
    }

    fn exists(&self, key: Key) -> bool {
        MultiLangBook::exists(self, key)
    }

    fn len(&self) -> usize {
        MultiLangBook::len(self)
    }

    fn state(&self) -> BookState {
        MultiLangBook::state(self)
    }

    fn label(&self) -> &str {
        MultiLangBook::label(self)
    }
}

impl<T: MultiLangItem> MultiLangBooker for MultiLangBook<T> {
    fn json(&self, lang: LanguageIndex) -> Option<Arc<[u8]>> {
        MultiLangBook::json(self, lang)
    }

    fn json_with_hash(&self, lang: LanguageIndex) -> Option<Arc<[u8]>> {
        MultiLangBook::json_with_hash(self, lang)
    }

    fn text(&self, key: Key, lang: LanguageIndex) -> String {
        MultiLangBook::text(self, key, lang)
    }
}
