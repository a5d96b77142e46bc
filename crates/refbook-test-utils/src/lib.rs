//! Testing utilities for refbook workspace
//!
//! Shared item fixtures, language registry and tracing setup.

#![allow(missing_docs)]

use std::sync::Arc;

use refbook_core::{
    HasKey, HasLocalizedName, HasName, Key, Language, LanguageIndex, LanguageRegistry,
    LocalizedName, StaticLanguages,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerType {
    pub id: Key,
    pub name: String,
    #[serde(rename = "isIndividual", default)]
    pub is_individual: bool,
}

impl CustomerType {
    pub fn new(id: Key, name: &str, is_individual: bool) -> Self {
        Self {
            id,
            name: name.to_string(),
            is_individual,
        }
    }
}

impl HasKey for CustomerType {
    fn key(&self) -> Key {
        self.id
    }
}

impl HasName for CustomerType {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerMultiLangType {
    pub id: Key,
    pub name: LocalizedName,
    #[serde(rename = "isIndividual", default)]
    pub is_individual: bool,
}

impl HasKey for CustomerMultiLangType {
    fn key(&self) -> Key {
        self.id
    }
}

impl HasLocalizedName for CustomerMultiLangType {
    fn localized_name(&self, lang: &Language) -> Option<&str> {
        self.name.get(lang)
    }
}

pub const CUSTOMER_TYPES_JSON: &str = r#"[{"id":1,"name":"Individual","isIndividual":true},{"id":2,"name":"Legal entity","isIndividual":false}]"#;

pub const CUSTOMER_ML_TYPES_JSON: &str = r#"[
    {"id":1,"name":{"en":"Individual","ru":"Физическое лицо"},"isIndividual":true},
    {"id":2,"name":{"en":"Legal entity","ru":"Юридическое лицо"},"isIndividual":false}
]"#;

/// Three statuses whose English and Russian alphabetical orders differ
pub const STATUSES_ML_JSON: &str = r#"[
    {"id":10,"name":{"en":"Active","ru":"Работает"},"isIndividual":false},
    {"id":20,"name":{"en":"Blocked","ru":"Заблокирован"},"isIndividual":false},
    {"id":30,"name":{"en":"Closed"},"isIndividual":false}
]"#;

pub fn languages() -> Arc<dyn LanguageRegistry> {
    Arc::new(StaticLanguages::new(["en", "ru"]))
}

pub fn en() -> LanguageIndex {
    LanguageIndex::new(0)
}

pub fn ru() -> LanguageIndex {
    LanguageIndex::new(1)
}

/// Install a test-writer subscriber honoring `RUST_LOG`; repeated calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
