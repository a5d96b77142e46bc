use refbook_source::{JsonDirSource, Row, SourceError, TableSource};
use std::fs;

fn collect(source: &JsonDirSource, table: &str) -> Result<Vec<Row>, SourceError> {
    let mut out = Vec::new();
    source.stream_rows(table, &mut |row| {
        out.push(row);
        Ok(())
    })?;
    Ok(out)
}

#[test]
fn reads_table_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("customer_types.json"),
        r#"[{"id":1,"name":"Individual"},{"id":2,"name":"Legal entity"}]"#,
    )
    .unwrap();

    let source = JsonDirSource::new(dir.path());
    let rows = collect(&source, "customer_types").unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1]["name"], "Legal entity");
}

#[test]
fn missing_file_is_table_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let source = JsonDirSource::new(dir.path());
    assert!(matches!(
        collect(&source, "absent"),
        Err(SourceError::TableNotFound(_))
    ));
}

#[test]
fn path_like_table_names_are_refused() {
    let dir = tempfile::tempdir().unwrap();
    let source = JsonDirSource::new(dir.path());
    for name in ["", "../etc", "a/b", ".hidden"] {
        assert!(matches!(
            collect(&source, name),
            Err(SourceError::TableNotFound(_))
        ));
    }
}

#[test]
fn malformed_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("broken.json"), "[{\"id\":1,").unwrap();
    let source = JsonDirSource::new(dir.path());
    assert!(matches!(
        collect(&source, "broken"),
        Err(SourceError::Malformed { .. })
    ));
}

#[test]
fn directory_in_place_of_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("weird.json")).unwrap();
    let source = JsonDirSource::new(dir.path());
    let err = collect(&source, "weird").unwrap_err();
    assert!(matches!(err, SourceError::Io { .. }));
    assert!(err.is_retryable());
}
