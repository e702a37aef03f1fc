use romset_db::*;

fn create_store_file(path: &std::path::Path) {
    let conn = Connection::open(path).unwrap();
    create_schema(&conn).unwrap();
    insert_header(&conn, Some("0.270"), Some("no"), Some("10")).unwrap();
}

#[test]
fn open_missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.db");
    assert!(matches!(
        open_store(&path),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn open_returns_cached_handle_for_same_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.db");
    create_store_file(&path);

    let first = open_store(&path).unwrap();
    let second = open_store(&path).unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(first.catalog_version().unwrap(), "0.270");

    first.close();
}

#[test]
fn close_evicts_from_cache() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.db");
    create_store_file(&path);

    let first = open_store(&path).unwrap();
    assert!(first.close());
    assert!(!close_store(&path));

    // A fresh open creates a new handle.
    let second = open_store(&path).unwrap();
    assert!(!std::sync::Arc::ptr_eq(&first, &second));
    second.close();
}

#[test]
fn queries_serialize_across_threads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.db");
    create_store_file(&path);

    let store = open_store(&path).unwrap();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = store.clone();
            std::thread::spawn(move || store.catalog_version().unwrap())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), "0.270");
    }
    store.close();
}
