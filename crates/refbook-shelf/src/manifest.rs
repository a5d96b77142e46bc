//! Shelf manifest: per-book hashes plus the total hash

use std::collections::BTreeMap;

use refbook_core::ContentHash;
use serde::{Deserialize, Serialize};

/// `{"book": {"<name>": "<hash>", ...}, "totalHash": "<hash>"}`
///
/// Hashes serialize as hex strings so JSON consumers never see them as
/// lossy numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Hash of every registered book, by name
    pub book: BTreeMap<String, ContentHash>,
    /// Hash over all member hashes in registration order
    #[serde(rename = "totalHash")]
    pub total_hash: ContentHash,
}

impl Manifest {
    /// Hash of the book registered as `name`
    #[must_use]
    pub fn get(&self, name: &str) -> Option<ContentHash> {
        self.book.get(name).copied()
    }

    /// Number of books listed
    #[must_use]
    pub fn len(&self) -> usize {
        self.book.len()
    }

    /// Check if no books are listed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.book.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_shape_uses_hex_strings() {
        let hash = ContentHash::compute(b"statuses");
        let manifest = Manifest {
            book: BTreeMap::from([("statuses".to_string(), hash)]),
            total_hash: ContentHash::combine([&hash]),
        };

        let value = serde_json::to_value(&manifest).unwrap();
        assert_eq!(value["book"]["statuses"], hash.to_string());
        assert_eq!(value["totalHash"], manifest.total_hash.to_string());

        let back: Manifest = serde_json::from_value(value).unwrap();
        assert_eq!(back, manifest);
        assert_eq!(back.get("statuses"), Some(hash));
        assert_eq!(back.get("other"), None);
    }
}
