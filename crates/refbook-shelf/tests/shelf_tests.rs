use std::sync::Arc;

use pretty_assertions::assert_eq;
use refbook_book::{
    BookError, BookState, Booker, MultiLangBook, MultiLangBooker, SingleLangBook, SingleLangBooker,
};
use refbook_core::{BookOptions, ContentHash};
use refbook_shelf::{Manifest, Shelf, ShelfError};
use refbook_source::{JsonDirSource, MemorySource};
use refbook_test_utils::{
    init_tracing, languages, ru, CustomerMultiLangType, CustomerType, CUSTOMER_ML_TYPES_JSON,
    CUSTOMER_TYPES_JSON,
};

fn customer_types() -> Arc<SingleLangBook<CustomerType>> {
    let book = SingleLangBook::new(BookOptions::new().with_name_sorting());
    book.parse(CUSTOMER_TYPES_JSON.as_bytes()).unwrap();
    Arc::new(book)
}

fn statuses() -> Arc<SingleLangBook<CustomerType>> {
    let book = SingleLangBook::new(BookOptions::new());
    book.parse(br#"[{"id":10,"name":"Active"},{"id":20,"name":"Blocked"}]"#)
        .unwrap();
    Arc::new(book)
}

#[test]
fn test_shelf_with_both_kinds() {
    init_tracing();
    let shelf = Shelf::new();
    shelf.register_single_lang("customer-type", customer_types());

    let mlb = Arc::new(MultiLangBook::<CustomerMultiLangType>::new(
        BookOptions::new().with_name_sorting(),
        languages(),
    ));
    shelf.register_multi_lang("customer-ml-type", mlb.clone());
    mlb.parse(CUSTOMER_ML_TYPES_JSON.as_bytes()).unwrap();

    shelf.compile().unwrap();

    let ml = shelf.multi_lang_book("customer-ml-type").unwrap();
    assert_eq!(ml.text(2, ru()), "Юридическое лицо");
    let single = shelf.single_lang_book("customer-type").unwrap();
    assert_eq!(single.text(2), "Legal entity");

    let manifest: Manifest = serde_json::from_slice(&shelf.manifest()).unwrap();
    assert_eq!(manifest, shelf.manifest_entries());
    assert_eq!(manifest.get("customer-type"), Some(single.hash()));
    assert_eq!(manifest.get("customer-ml-type"), Some(mlb.hash()));
    assert_eq!(
        manifest.total_hash,
        ContentHash::combine([&single.hash(), &mlb.hash()])
    );
    assert_eq!(shelf.state(), BookState::Compiled);
}

#[test]
fn test_manifest_wire_format() {
    let shelf = Shelf::new();
    shelf.register_single_lang("statuses", statuses());
    shelf.compile().unwrap();

    let value: serde_json::Value = serde_json::from_slice(&shelf.manifest()).unwrap();
    let hash = value["book"]["statuses"].as_str().unwrap();
    assert_eq!(hash.len(), 64);
    assert_eq!(value["totalHash"].as_str().unwrap(), shelf.total_hash().to_string());
}

#[test]
fn test_total_hash_follows_registration_order() {
    let a = customer_types();
    let b = statuses();

    let forward = Shelf::new();
    forward.register_single_lang("a", a.clone());
    forward.register_single_lang("b", b.clone());
    forward.compile().unwrap();

    let backward = Shelf::new();
    backward.register_single_lang("b", b);
    backward.register_single_lang("a", a);
    backward.compile().unwrap();

    assert_eq!(
        forward.manifest_entries().book,
        backward.manifest_entries().book
    );
    assert_ne!(forward.total_hash(), backward.total_hash());
}

#[test]
fn test_singles_aggregate_before_multis() {
    let single = customer_types();
    let multi = Arc::new(MultiLangBook::<CustomerMultiLangType>::new(
        BookOptions::new(),
        languages(),
    ));
    multi.parse(CUSTOMER_ML_TYPES_JSON.as_bytes()).unwrap();

    let shelf = Shelf::new();
    shelf.register_multi_lang("ml", multi.clone());
    shelf.register_single_lang("single", single.clone());
    shelf.compile().unwrap();

    assert_eq!(shelf.names(), vec!["single", "ml"]);
    assert_eq!(
        shelf.total_hash(),
        ContentHash::combine([&single.hash(), &multi.hash()])
    );
}

#[test]
fn test_failed_compile_keeps_previous_manifest() {
    init_tracing();
    let shelf = Shelf::new();
    shelf.register_single_lang("statuses", statuses());
    shelf.compile().unwrap();
    let before = shelf.manifest();
    let total = shelf.total_hash();

    // Strict book whose staged items collide on a key
    let strict = Arc::new(SingleLangBook::<CustomerType>::new(
        BookOptions::new().with_strict_keys(),
    ));
    strict
        .set_items(vec![
            CustomerType::new(1, "a", true),
            CustomerType::new(2, "b", true),
        ])
        .unwrap();
    strict.update_item(2, |item| item.id = 1);
    shelf.register_single_lang("strict", strict);

    let err = shelf.compile().unwrap_err();
    assert_eq!(err.book_name(), Some("strict"));
    assert!(matches!(
        err,
        ShelfError::Book {
            source: BookError::DuplicateKey { key: 1 },
            ..
        }
    ));
    assert_eq!(shelf.manifest(), before);
    assert_eq!(shelf.total_hash(), total);
    assert_eq!(shelf.state(), BookState::Loaded);
}

#[test]
fn test_load_all_from_memory() {
    init_tracing();
    let source = MemorySource::new()
        .with_json_table("customer_types", CUSTOMER_TYPES_JSON)
        .unwrap()
        .with_json_table("customer_ml_types", CUSTOMER_ML_TYPES_JSON)
        .unwrap();

    let single = Arc::new(SingleLangBook::<CustomerType>::new(
        BookOptions::new().with_table("customer_types"),
    ));
    let multi = Arc::new(MultiLangBook::<CustomerMultiLangType>::new(
        BookOptions::new().with_table("customer_ml_types"),
        languages(),
    ));

    let shelf = Shelf::new();
    shelf.register_single_lang("customer-type", single.clone());
    shelf.register_multi_lang("customer-ml-type", multi.clone());
    shelf.load_all(&source).unwrap();

    assert_eq!(single.len(), 2);
    assert_eq!(multi.text(1, ru()), "Физическое лицо");
    assert_eq!(shelf.manifest_entries().len(), 2);
}

#[test]
fn test_load_all_aborts_on_misconfigured_book() {
    let source = MemorySource::new()
        .with_json_table("customer_types", CUSTOMER_TYPES_JSON)
        .unwrap();

    let shelf = Shelf::new();
    shelf.register_single_lang(
        "configured",
        Arc::new(SingleLangBook::<CustomerType>::new(
            BookOptions::new().with_table("customer_types"),
        )),
    );
    let unconfigured = Arc::new(SingleLangBook::<CustomerType>::new(BookOptions::new()));
    shelf.register_single_lang("unconfigured", unconfigured.clone());

    let err = shelf.load_all(&source).unwrap_err();
    assert!(err.is_critical());
    assert_eq!(err.status_code(), 500);
    assert_eq!(err.book_name(), Some("unconfigured"));
    assert!(unconfigured.is_empty());
    assert!(shelf.total_hash().is_zero());
}

#[test]
fn test_load_all_from_json_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("customer_types.json"), CUSTOMER_TYPES_JSON).unwrap();

    let book = Arc::new(SingleLangBook::<CustomerType>::new(
        BookOptions::new().with_table("customer_types").with_key_sorting(),
    ));
    let shelf = Shelf::new();
    shelf.register_single_lang("customer-type", book.clone());
    shelf.load_all(&JsonDirSource::new(dir.path())).unwrap();

    assert_eq!(book.text(1), "Individual");
    assert_eq!(shelf.manifest_entries().get("customer-type"), Some(book.hash()));
}
