//! Shelf: a named registry of books
//!
//! Books are held in two registration-ordered sequences, one per kind, plus
//! a name index over both. Shelf compile rebuilds every member, then
//! publishes the total hash and manifest as one snapshot.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::{Mutex, RwLock};
use refbook_book::{BookError, BookState, Booker, MultiLangBooker, SingleLangBooker};
use refbook_core::ContentHash;
use refbook_source::TableSource;

use crate::error::ShelfError;
use crate::manifest::Manifest;

/// Kind of a registered book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookKind {
    /// Registered through [`Shelf::register_single_lang`]
    SingleLang,
    /// Registered through [`Shelf::register_multi_lang`]
    MultiLang,
}

impl BookKind {
    /// Check if this is the multi-language kind
    #[inline]
    #[must_use]
    pub fn is_multi_lang(self) -> bool {
        matches!(self, Self::MultiLang)
    }
}

enum Member {
    Single(Arc<dyn SingleLangBooker>),
    Multi(Arc<dyn MultiLangBooker>),
}

impl Member {
    fn compile(&self) -> Result<(), BookError> {
        match self {
            Self::Single(book) => book.compile(),
            Self::Multi(book) => book.compile(),
        }
    }

    fn load_from_source(&self, source: &dyn TableSource) -> Result<(), BookError> {
        match self {
            Self::Single(book) => book.load_from_source(source),
            Self::Multi(book) => book.load_from_source(source),
        }
    }

    fn hash(&self) -> ContentHash {
        match self {
            Self::Single(book) => book.hash(),
            Self::Multi(book) => book.hash(),
        }
    }
}

#[derive(Default)]
struct Registry {
    singles: Vec<(String, Arc<dyn SingleLangBooker>)>,
    multis: Vec<(String, Arc<dyn MultiLangBooker>)>,
    names: HashMap<String, (BookKind, usize)>,
    generation: u64,
    state: BookState,
}

impl Registry {
    /// Drop `name` from its sequence and shift the positions after it
    fn remove(&mut self, name: &str, kind: BookKind, pos: usize) {
        self.names.remove(name);
        let shifted: Vec<String> = match kind {
            BookKind::SingleLang => {
                self.singles.remove(pos);
                self.singles[pos..].iter().map(|(n, _)| n.clone()).collect()
            }
            BookKind::MultiLang => {
                self.multis.remove(pos);
                self.multis[pos..].iter().map(|(n, _)| n.clone()).collect()
            }
        };
        for n in shifted {
            if let Some((_, p)) = self.names.get_mut(&n) {
                *p -= 1;
            }
        }
    }

    fn touch(&mut self) {
        self.generation += 1;
        self.state = BookState::Loaded;
    }

    /// Members in aggregation order: singles, then multis
    fn members(&self) -> Vec<(String, Member)> {
        let singles = self
            .singles
            .iter()
            .map(|(name, book)| (name.clone(), Member::Single(Arc::clone(book))));
        let multis = self
            .multis
            .iter()
            .map(|(name, book)| (name.clone(), Member::Multi(Arc::clone(book))));
        singles.chain(multis).collect()
    }
}

#[derive(Debug)]
struct ShelfSnapshot {
    manifest: Manifest,
    json: Arc<[u8]>,
}

impl Default for ShelfSnapshot {
    fn default() -> Self {
        Self {
            manifest: Manifest::default(),
            json: Arc::from(Vec::new()),
        }
    }
}

/// Named registry of single- and multi-language books
///
/// Registration is by name; re-registering a name replaces the previous
/// book. When the kind matches the book keeps its slot, otherwise it moves
/// to the end of the other kind's sequence. Replaced books never contribute
/// to the total hash or the manifest.
#[derive(Default)]
pub struct Shelf {
    registry: RwLock<Registry>,
    writer: Mutex<()>,
    current: ArcSwap<ShelfSnapshot>,
}

impl Shelf {
    /// Create empty shelf
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a single-language book under `name`
    pub fn register_single_lang(&self, name: impl Into<String>, book: Arc<dyn SingleLangBooker>) {
        let name = name.into();
        let mut reg = self.registry.write();
        match reg.names.get(&name).copied() {
            Some((BookKind::SingleLang, pos)) => reg.singles[pos].1 = book,
            prior => {
                if let Some((kind, pos)) = prior {
                    reg.remove(&name, kind, pos);
                }
                let pos = reg.singles.len();
                reg.singles.push((name.clone(), book));
                reg.names.insert(name, (BookKind::SingleLang, pos));
            }
        }
        reg.touch();
    }

    /// Register a multi-language book under `name`
    pub fn register_multi_lang(&self, name: impl Into<String>, book: Arc<dyn MultiLangBooker>) {
        let name = name.into();
        let mut reg = self.registry.write();
        match reg.names.get(&name).copied() {
            Some((BookKind::MultiLang, pos)) => reg.multis[pos].1 = book,
            prior => {
                if let Some((kind, pos)) = prior {
                    reg.remove(&name, kind, pos);
                }
                let pos = reg.multis.len();
                reg.multis.push((name.clone(), book));
                reg.names.insert(name, (BookKind::MultiLang, pos));
            }
        }
        reg.touch();
    }

    /// Kind of the book registered as `name`
    #[must_use]
    pub fn lookup_kind(&self, name: &str) -> Option<BookKind> {
        self.registry.read().names.get(name).map(|&(kind, _)| kind)
    }

    /// Single-language book registered as `name`
    ///
    /// `None` also when `name` holds a multi-language book.
    #[must_use]
    pub fn single_lang_book(&self, name: &str) -> Option<Arc<dyn SingleLangBooker>> {
        let reg = self.registry.read();
        match reg.names.get(name) {
            Some(&(BookKind::SingleLang, pos)) => Some(Arc::clone(&reg.singles[pos].1)),
            _ => None,
        }
    }

    /// Multi-language book registered as `name`
    ///
    /// `None` also when `name` holds a single-language book.
    #[must_use]
    pub fn multi_lang_book(&self, name: &str) -> Option<Arc<dyn MultiLangBooker>> {
        let reg = self.registry.read();
        match reg.names.get(name) {
            Some(&(BookKind::MultiLang, pos)) => Some(Arc::clone(&reg.multis[pos].1)),
            _ => None,
        }
    }

    /// Compile every member, then publish the total hash and manifest
    ///
    /// # Errors
    /// Returns the first member failure. Members compiled before it keep
    /// their fresh state; the shelf keeps its previous manifest.
    pub fn compile(&self) -> Result<(), ShelfError> {
        let _writer = self.writer.lock();
        let (members, generation) = self.members();
        self.compile_members(&members, generation)
    }

    /// Load every member from `source`, then compile the shelf
    ///
    /// # Errors
    /// Returns the first member failure; the remaining members are not loaded
    pub fn load_all(&self, source: &dyn TableSource) -> Result<(), ShelfError> {
        let _writer = self.writer.lock();
        let (members, generation) = self.members();
        for (name, member) in &members {
            member.load_from_source(source).map_err(|e| {
                tracing::error!("Shelf: failed to load book '{}': {}", name, e);
                ShelfError::book(name, e)
            })?;
        }
        self.compile_members(&members, generation)
    }

    fn members(&self) -> (Vec<(String, Member)>, u64) {
        let reg = self.registry.read();
        (reg.members(), reg.generation)
    }

    fn compile_members(
        &self,
        members: &[(String, Member)],
        generation: u64,
    ) -> Result<(), ShelfError> {
        let mut hashes = Vec::with_capacity(members.len());
        let mut entries = BTreeMap::new();
        for (name, member) in members {
            member.compile().map_err(|e| {
                tracing::error!("Shelf: failed to compile book '{}': {}", name, e);
                ShelfError::book(name, e)
            })?;
            let hash = member.hash();
            hashes.push(hash);
            entries.insert(name.clone(), hash);
        }

        let manifest = Manifest {
            book: entries,
            total_hash: ContentHash::combine(&hashes),
        };
        let json = serde_json::to_vec(&manifest).map_err(|e| ShelfError::JsonRender {
            message: e.to_string(),
        })?;

        tracing::info!(
            "Compiled shelf: {} books, total hash {}",
            members.len(),
            manifest.total_hash.short()
        );
        self.current.store(Arc::new(ShelfSnapshot {
            manifest,
            json: Arc::from(json),
        }));

        let mut reg = self.registry.write();
        if reg.generation == generation {
            reg.state = BookState::Compiled;
        }
        Ok(())
    }

    /// Hash over every member hash, zero before the first compile
    #[must_use]
    pub fn total_hash(&self) -> ContentHash {
        self.current.load().manifest.total_hash
    }

    /// Manifest JSON, empty before the first compile
    #[must_use]
    pub fn manifest(&self) -> Arc<[u8]> {
        Arc::clone(&self.current.load().json)
    }

    /// Typed manifest of the last compile
    #[must_use]
    pub fn manifest_entries(&self) -> Manifest {
        self.current.load().manifest.clone()
    }

    /// Registered names, singles first, each kind in registration order
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let reg = self.registry.read();
        reg.singles
            .iter()
            .map(|(name, _)| name.clone())
            .chain(reg.multis.iter().map(|(name, _)| name.clone()))
            .collect()
    }

    /// Number of registered books
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.read().names.len()
    }

    /// Check if no book is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lifecycle state
    ///
    /// `Loaded` after any registration that the last compile did not cover.
    #[must_use]
    pub fn state(&self) -> BookState {
        self.registry.read().state
    }
}

impl std::fmt::Debug for Shelf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shelf")
            .field("names", &self.names())
            .field("state", &self.state())
            .field("total_hash", &self.total_hash().short())
            .finish_non_exhaustive()
    }
}
