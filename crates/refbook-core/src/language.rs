//! Language registry contract
//!
//! Books never own the list of supported locales. They ask a
//! [`LanguageRegistry`] at compile time and key their per-language exports
//! by [`LanguageIndex`].

use std::collections::BTreeMap;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Internal numeric identifier of a supported language
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageIndex(u16);

impl LanguageIndex {
    /// Wrap a raw index
    #[inline]
    #[must_use]
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    /// Raw index value
    #[inline]
    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }
}

impl Display for LanguageIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A resolved language: its index together with its code
///
/// Item types keyed by code (`"en"`) and item types keyed by index can both
/// answer [`HasLocalizedName`](crate::HasLocalizedName) from this.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Language {
    index: LanguageIndex,
    code: Arc<str>,
}

impl Language {
    /// Pair an index with its code
    #[must_use]
    pub fn new(index: LanguageIndex, code: impl Into<Arc<str>>) -> Self {
        Self {
            index,
            code: code.into(),
        }
    }

    /// Index of this language
    #[inline]
    #[must_use]
    pub fn index(&self) -> LanguageIndex {
        self.index
    }

    /// Code of this language, e.g. `"en"`
    #[inline]
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }
}

/// Source of the currently supported languages
pub trait LanguageRegistry: Send + Sync + Debug {
    /// Every supported language, in a stable order
    fn supported(&self) -> Vec<Language>;

    /// Convert a language code to its index
    fn to_index(&self, code: &str) -> Option<LanguageIndex>;

    /// Convert an index back to its code
    fn to_code(&self, index: LanguageIndex) -> Option<&str>;

    /// Resolve an index to a full [`Language`]
    fn language(&self, index: LanguageIndex) -> Option<Language> {
        self.to_code(index).map(|code| Language::new(index, code))
    }
}

/// Fixed language list; the index of a code is its position
#[derive(Debug, Clone, Default)]
pub struct StaticLanguages {
    codes: Vec<Arc<str>>,
}

impl StaticLanguages {
    /// Build from codes in index order
    ///
    /// Repeated codes keep their first position.
    #[must_use]
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list: Vec<Arc<str>> = Vec::new();
        for code in codes {
            let code = code.as_ref();
            if !list.iter().any(|c| &**c == code) {
                list.push(Arc::from(code));
            }
        }
        Self { codes: list }
    }

    /// Number of languages
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// True if no language is configured
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl LanguageRegistry for StaticLanguages {
    fn supported(&self) -> Vec<Language> {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(i, code)| {
                let raw = u16::try_from(i).ok()?;
                Some(Language {
                    index: LanguageIndex(raw),
                    code: Arc::clone(code),
                })
            })
            .collect()
    }

    fn to_index(&self, code: &str) -> Option<LanguageIndex> {
        let pos = self.codes.iter().position(|c| &**c == code)?;
        u16::try_from(pos).ok().map(LanguageIndex)
    }

    fn to_code(&self, index: LanguageIndex) -> Option<&str> {
        self.codes.get(usize::from(index.0)).map(|c| &**c)
    }
}

/// Display text keyed by language code
///
/// Deserializes from and serializes to a plain JSON object such as
/// `{"en": "Individual", "ru": "Физическое лицо"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedName(BTreeMap<String, String>);

impl LocalizedName {
    /// Empty name
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the text for a language code
    #[must_use]
    pub fn with(mut self, code: impl Into<String>, text: impl Into<String>) -> Self {
        self.0.insert(code.into(), text.into());
        self
    }

    /// Text for a language, if translated
    #[must_use]
    pub fn get(&self, lang: &Language) -> Option<&str> {
        self.by_code(lang.code())
    }

    /// Text for a language code, if translated
    #[must_use]
    pub fn by_code(&self, code: &str) -> Option<&str> {
        self.0.get(code).map(String::as_str)
    }
}

impl<K, V> FromIterator<(K, V)> for LocalizedName
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
