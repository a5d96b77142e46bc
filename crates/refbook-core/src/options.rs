//! Book configuration
//!
//! [`BookOptions`] is consumed once, at book construction.

use serde::{Deserialize, Serialize};

use crate::language::LanguageIndex;

/// Order applied to items on compile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMethod {
    /// Keep load order
    #[default]
    None,
    /// Ascending display text
    ByName,
    /// Ascending primary key
    ByKey,
}

/// What a compile does when two items share a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Index the last item seen for the key; earlier ones stay in the
    /// item list but are unreachable by key
    #[default]
    LastWins,
    /// Fail the compile
    Reject,
}

/// Book configuration
///
/// ```rust
/// use refbook_core::{BookOptions, SortMethod};
///
/// let opts = BookOptions::new().with_name_sorting().with_table("customer_types");
/// assert_eq!(opts.sort_method, SortMethod::ByName);
/// assert_eq!(opts.table.as_deref(), Some("customer_types"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookOptions {
    /// Sort applied on every compile
    pub sort_method: SortMethod,
    /// Data-source identifier (table name); required for source loads
    pub table: Option<String>,
    /// Language used by the `*_default` accessors of multi-language books
    pub default_language: Option<LanguageIndex>,
    /// Duplicate-key handling
    pub duplicate_policy: DuplicatePolicy,
    /// Label used in log lines when no table is configured
    pub label: Option<String>,
}

impl BookOptions {
    /// Default options: no sort, no table, lenient keys
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With explicit sort method
    #[inline]
    #[must_use]
    pub fn with_sort(mut self, method: SortMethod) -> Self {
        self.sort_method = method;
        self
    }

    /// Sort by display text
    #[inline]
    #[must_use]
    pub fn with_name_sorting(self) -> Self {
        self.with_sort(SortMethod::ByName)
    }

    /// Sort by primary key
    #[inline]
    #[must_use]
    pub fn with_key_sorting(self) -> Self {
        self.with_sort(SortMethod::ByKey)
    }

    /// With data-source table
    #[inline]
    #[must_use]
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// With default language
    #[inline]
    #[must_use]
    pub fn with_default_language(mut self, lang: LanguageIndex) -> Self {
        self.default_language = Some(lang);
        self
    }

    /// With duplicate-key policy
    #[inline]
    #[must_use]
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// Reject duplicate keys on compile
    #[inline]
    #[must_use]
    pub fn with_strict_keys(self) -> Self {
        self.with_duplicate_policy(DuplicatePolicy::Reject)
    }

    /// With log label
    #[inline]
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Name to use in log lines and errors: label, else table, else `"book"`
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.label
            .as_deref()
            .or(self.table.as_deref())
            .unwrap_or("book")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = BookOptions::new();
        assert_eq!(opts.sort_method, SortMethod::None);
        assert_eq!(opts.duplicate_policy, DuplicatePolicy::LastWins);
        assert!(opts.table.is_none());
        assert!(opts.default_language.is_none());
    }

    #[test]
    fn builders_compose_last_wins() {
        let opts = BookOptions::new()
            .with_name_sorting()
            .with_key_sorting()
            .with_strict_keys()
            .with_default_language(LanguageIndex::new(1));
        assert_eq!(opts.sort_method, SortMethod::ByKey);
        assert_eq!(opts.duplicate_policy, DuplicatePolicy::Reject);
        assert_eq!(opts.default_language, Some(LanguageIndex::new(1)));
    }

    #[test]
    fn display_name_prefers_label() {
        assert_eq!(BookOptions::new().display_name(), "book");
        assert_eq!(BookOptions::new().with_table("t").display_name(), "t");
        assert_eq!(
            BookOptions::new().with_table("t").with_label("statuses").display_name(),
            "statuses"
        );
    }

    #[test]
    fn deserializes_partial_config() {
        let opts: BookOptions =
            serde_json::from_str(r#"{"sort_method":"by_name","table":"statuses"}"#).unwrap();
        assert_eq!(opts.sort_method, SortMethod::ByName);
        assert_eq!(opts.table.as_deref(), Some("statuses"));
        assert_eq!(opts.duplicate_policy, DuplicatePolicy::LastWins);
    }
}
