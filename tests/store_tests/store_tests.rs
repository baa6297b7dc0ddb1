//! Tests for TableStore
//!
//! These tests verify:
//! - Table creation and listing
//! - Bulk mutations with per-row validation
//! - Cell versioning and timestamps
//! - Concurrent writers

use std::sync::Arc;
use std::thread;

use bytes::Bytes;
use tabload::mutation::{Mutation, RowMutations, Timestamp};
use tabload::store::DEFAULT_MAX_VERSIONS;
use tabload::{TableStore, TabloadError};

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_store() -> TableStore {
    let store = TableStore::new();
    store.create_table("t", ["cf", "meta"]).unwrap();
    store
}

fn set(row_key: &str, family: &str, column: &str, value: &'static str) -> RowMutations {
    RowMutations {
        row_key: row_key.to_string(),
        mutations: vec![Mutation::set_cell(family, column, value)],
    }
}

fn set_at(row_key: &str, ts: i64, value: &'static str) -> RowMutations {
    RowMutations {
        row_key: row_key.to_string(),
        mutations: vec![Mutation::SetCell {
            family: "cf".to_string(),
            column: "col".to_string(),
            timestamp: Timestamp::Micros(ts),
            value: Bytes::from(value),
        }],
    }
}

// =============================================================================
// Table Management Tests
// =============================================================================

#[test]
fn test_create_and_list_tables() {
    let store = TableStore::new();
    store.create_table("zeta", ["cf"]).unwrap();
    store.create_table("alpha", ["cf"]).unwrap();

    assert!(store.has_table("alpha"));
    assert!(!store.has_table("beta"));
    assert_eq!(store.list_tables(), vec!["alpha", "zeta"]);
}

#[test]
fn test_create_duplicate_table_fails() {
    let store = setup_store();
    let result = store.create_table("t", ["cf"]);
    assert!(matches!(result, Err(TabloadError::TableExists(name)) if name == "t"));
}

#[test]
fn test_missing_table_fails_whole_request() {
    let store = TableStore::new();

    assert!(matches!(
        store.mutate_rows("missing", &[set("a", "cf", "col", "1")]),
        Err(TabloadError::TableNotFound(_))
    ));
    assert!(matches!(
        store.read_row("missing", "a"),
        Err(TabloadError::TableNotFound(_))
    ));
    assert!(store.row_count("missing").is_err());
}

// =============================================================================
// Mutation Tests
// =============================================================================

#[test]
fn test_mutate_and_read_back() {
    let store = setup_store();
    let errors = store
        .mutate_rows("t", &[set("a", "cf", "col", "1"), set("b", "meta", "tag", "x")])
        .unwrap();

    assert!(errors.is_empty());
    assert_eq!(store.row_count("t").unwrap(), 2);

    let row = store.read_row("t", "b").unwrap().unwrap();
    assert_eq!(row.key, "b");
    assert_eq!(row.latest("meta", "tag").unwrap().value, Bytes::from("x"));
    assert!(row.latest("cf", "col").is_none());
}

#[test]
fn test_read_missing_row() {
    let store = setup_store();
    assert!(store.read_row("t", "nothing").unwrap().is_none());
}

#[test]
fn test_row_errors_do_not_stop_other_rows() {
    let store = setup_store();
    let entries = vec![
        set("a", "cf", "col", "1"),
        set("b", "unknown", "col", "2"),
        set("", "cf", "col", "3"),
        set("d", "cf", "col", "4"),
    ];

    let errors = store.mutate_rows("t", &entries).unwrap();

    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].index, 1);
    assert_eq!(errors[0].row_key, "b");
    assert!(errors[0].message.contains("unknown"));
    assert_eq!(errors[1].index, 2);
    assert_eq!(store.row_count("t").unwrap(), 2);
    assert!(store.read_row("t", "b").unwrap().is_none());
}

#[test]
fn test_failed_row_is_not_partially_applied() {
    let store = setup_store();
    let entry = RowMutations {
        row_key: "a".to_string(),
        mutations: vec![
            Mutation::set_cell("cf", "col", "ok"),
            Mutation::set_cell("nope", "col", "bad"),
        ],
    };

    let errors = store.mutate_rows("t", &[entry]).unwrap();

    assert_eq!(errors.len(), 1);
    assert!(store.read_row("t", "a").unwrap().is_none());
}

#[test]
fn test_delete_row() {
    let store = setup_store();
    store.mutate_rows("t", &[set("a", "cf", "col", "1")]).unwrap();

    let delete = RowMutations {
        row_key: "a".to_string(),
        mutations: vec![Mutation::DeleteRow],
    };
    store.mutate_rows("t", &[delete]).unwrap();

    assert!(store.read_row("t", "a").unwrap().is_none());
    assert_eq!(store.row_count("t").unwrap(), 0);
}

// =============================================================================
// Versioning Tests
// =============================================================================

#[test]
fn test_versions_are_newest_first() {
    let store = setup_store();
    store
        .mutate_rows("t", &[set_at("a", 10, "old"), set_at("a", 30, "new"), set_at("a", 20, "mid")])
        .unwrap();

    let row = store.read_row("t", "a").unwrap().unwrap();
    let timestamps: Vec<i64> = row.cells.iter().map(|c| c.timestamp_micros).collect();

    assert_eq!(timestamps, vec![30, 20, 10]);
    assert_eq!(row.latest("cf", "col").unwrap().value, Bytes::from("new"));
}

#[test]
fn test_same_timestamp_replaces_version() {
    let store = setup_store();
    store.mutate_rows("t", &[set_at("a", 10, "first")]).unwrap();
    store.mutate_rows("t", &[set_at("a", 10, "second")]).unwrap();

    let row = store.read_row("t", "a").unwrap().unwrap();
    assert_eq!(row.cells.len(), 1);
    assert_eq!(row.cells[0].value, Bytes::from("second"));
}

#[test]
fn test_server_time_is_assigned() {
    let store = setup_store();
    store.mutate_rows("t", &[set("a", "cf", "col", "v")]).unwrap();

    let row = store.read_row("t", "a").unwrap().unwrap();
    // Well after 2001-09-09 in microseconds
    assert!(row.cells[0].timestamp_micros > 1_000_000_000_000_000);
}

#[test]
fn test_versions_capped_at_limit() {
    let store = TableStore::with_max_versions(2);
    store.create_table("t", ["cf"]).unwrap();

    store
        .mutate_rows("t", &[set_at("a", 10, "v1"), set_at("a", 20, "v2"), set_at("a", 30, "v3")])
        .unwrap();

    let row = store.read_row("t", "a").unwrap().unwrap();
    let timestamps: Vec<i64> = row.cells.iter().map(|c| c.timestamp_micros).collect();
    assert_eq!(timestamps, vec![30, 20]);
}

#[test]
fn test_write_older_than_kept_versions_is_dropped() {
    let store = TableStore::with_max_versions(2);
    store.create_table("t", ["cf"]).unwrap();

    store.mutate_rows("t", &[set_at("a", 30, "new"), set_at("a", 20, "mid")]).unwrap();
    store.mutate_rows("t", &[set_at("a", 10, "old")]).unwrap();

    let row = store.read_row("t", "a").unwrap().unwrap();
    let values: Vec<&[u8]> = row.cells.iter().map(|c| c.value.as_ref()).collect();
    assert_eq!(values, vec![&b"new"[..], &b"mid"[..]]);
}

#[test]
fn test_repeated_server_time_writes_stay_bounded() {
    let store = setup_store();
    assert_eq!(store.max_versions(), DEFAULT_MAX_VERSIONS);

    for _ in 0..20 {
        store.mutate_rows("t", &[set("a", "cf", "col", "v")]).unwrap();
    }

    let row = store.read_row("t", "a").unwrap().unwrap();
    assert!(!row.cells.is_empty());
    assert!(row.cells.len() <= DEFAULT_MAX_VERSIONS);
}

#[test]
fn test_zero_max_versions_keeps_one() {
    let store = TableStore::with_max_versions(0);
    assert_eq!(store.max_versions(), 1);
    store.create_table("t", ["cf"]).unwrap();

    store.mutate_rows("t", &[set_at("a", 10, "old"), set_at("a", 20, "new")]).unwrap();

    let row = store.read_row("t", "a").unwrap().unwrap();
    assert_eq!(row.cells.len(), 1);
    assert_eq!(row.cells[0].value, Bytes::from("new"));
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_bulk_writers() {
    let store = Arc::new(setup_store());

    let handles: Vec<_> = (0..4)
        .map(|w| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for batch in 0..10 {
                    let entries: Vec<RowMutations> = (0..25)
                        .map(|i| RowMutations {
                            row_key: format!("w{}-b{}-r{}", w, batch, i),
                            mutations: vec![Mutation::set_cell("cf", "col", "v")],
                        })
                        .collect();
                    let errors = store.mutate_rows("t", &entries).unwrap();
                    assert!(errors.is_empty());
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.row_count("t").unwrap(), 4 * 10 * 25);
}
