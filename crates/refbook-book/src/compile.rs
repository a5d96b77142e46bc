//! Build steps shared by both book kinds
//!
//! Everything here is pure over the snapshot being built; nothing touches
//! published state.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU8, Ordering};

use refbook_core::{
    ContentHash, DuplicatePolicy, HasKey, HasLocalizedName, Key, Language, SortMethod,
};
use refbook_source::{SourceError, TableSource};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::value::RawValue;
use serde_json::Value;

use crate::booker::BookState;
use crate::error::BookError;

/// Writer-side state: the items the next compile will publish
#[derive(Debug)]
pub(crate) struct Staging<T> {
    pub(crate) items: Vec<T>,
}

impl<T> Default for Staging<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: HasKey> Staging<T> {
    /// Mutate the item indexed under `key` (the last one carrying it)
    pub(crate) fn update(&mut self, key: Key, f: impl FnOnce(&mut T)) -> bool {
        match self.items.iter_mut().rev().find(|item| item.key() == key) {
            Some(item) => {
                f(item);
                true
            }
            None => false,
        }
    }

    pub(crate) fn update_all(&mut self, f: impl FnMut(&mut T)) {
        self.items.iter_mut().for_each(f);
    }
}

/// Lifecycle state readable without the writer lock
#[derive(Debug, Default)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub(crate) fn get(&self) -> BookState {
        match self.0.load(Ordering::Acquire) {
            1 => BookState::Loaded,
            2 => BookState::Compiled,
            _ => BookState::Empty,
        }
    }

    pub(crate) fn set(&self, state: BookState) {
        self.0.store(state as u8, Ordering::Release);
    }
}

/// Stable sort; ties keep their relative order
pub(crate) fn sort_items<E, K, N>(items: &mut [E], method: SortMethod, key_of: K, name_of: N)
where
    K: Fn(&E) -> Key,
    N: Fn(&E) -> &str,
{
    match method {
        SortMethod::None => {}
        SortMethod::ByName => items.sort_by(|a, b| name_of(a).cmp(name_of(b))),
        SortMethod::ByKey => items.sort_by_key(key_of),
    }
}

/// Key to position map over the final item order
pub(crate) fn build_index<T: HasKey>(
    items: &[T],
    policy: DuplicatePolicy,
    label: &str,
) -> Result<HashMap<Key, usize>, BookError> {
    let mut index = HashMap::with_capacity(items.len());
    for (pos, item) in items.iter().enumerate() {
        let key = item.key();
        if let Some(prev) = index.insert(key, pos) {
            match policy {
                DuplicatePolicy::Reject => return Err(BookError::DuplicateKey { key }),
                DuplicatePolicy::LastWins => tracing::warn!(
                    "Book '{}': key {} at position {} shadows position {}",
                    label,
                    key,
                    pos,
                    prev
                ),
            }
        }
    }
    Ok(index)
}

pub(crate) fn render_json<T: Serialize>(items: &[T]) -> Result<Vec<u8>, BookError> {
    serde_json::to_vec(items).map_err(BookError::render)
}

/// `{"items": <json>, "hash": "<hex>"}`
pub(crate) fn render_envelope(json: &[u8], hash: &ContentHash) -> Result<Vec<u8>, BookError> {
    #[derive(Serialize)]
    struct Envelope<'a> {
        items: &'a RawValue,
        hash: &'a ContentHash,
    }

    let items: &RawValue = serde_json::from_slice(json).map_err(BookError::render)?;
    serde_json::to_vec(&Envelope { items, hash }).map_err(BookError::render)
}

/// JSON array where each item's name field carries its flat text in `lang`
///
/// Items are lowered to JSON objects, the name field is overwritten, and the
/// array is written in the given order. Missing translations become `""`.
/// Fields keep their declaration order and the name field keeps its slot.
pub(crate) fn render_localized<T>(items: &[&T], lang: &Language) -> Result<Vec<u8>, BookError>
where
    T: HasKey + HasLocalizedName + Serialize,
{
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let Value::Object(mut obj) = serde_json::to_value(item).map_err(BookError::render)? else {
            return Err(BookError::render(format!(
                "item {} does not serialize to a JSON object",
                item.key()
            )));
        };
        let text = item.localized_name(lang).unwrap_or_default();
        obj.insert(T::NAME_FIELD.to_string(), Value::String(text.to_string()));
        out.push(Value::Object(obj));
    }
    serde_json::to_vec(&out).map_err(BookError::render)
}

/// Drain a source table into items
pub(crate) fn load_items<T: DeserializeOwned>(
    source: &dyn TableSource,
    table: &str,
) -> Result<Vec<T>, BookError> {
    let mut items: Vec<T> = Vec::new();
    source.stream_rows(table, &mut |row| {
        let item: T = serde_json::from_value(Value::Object(row))
            .map_err(|e| SourceError::row(table, items.len(), e))?;
        items.push(item);
        Ok(())
    })?;
    Ok(items)
}
