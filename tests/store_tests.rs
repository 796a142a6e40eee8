//! Integration tests for the table store.
//!
//! Every test runs against its own temporary database file so tests can
//! run in parallel without sharing engine state.

use std::ops::ControlFlow;

use tempfile::TempDir;

use tabstore::{
    ColumnSpec, ColumnType, InsertError, QueryError, Row, SchemaError, TableStore, Value,
};

fn temp_store() -> (TableStore, TempDir) {
    let dir = TempDir::new().unwrap();
    let store = TableStore::new(dir.path().join("test.db"));
    (store, dir)
}

fn define_high_score(store: &TableStore) {
    store
        .define_schema(
            "high_score",
            vec![
                ColumnSpec::new("name", ColumnType::Text),
                ColumnSpec::new("score", ColumnType::Integer),
            ],
        )
        .unwrap();
}

fn insert_generals(store: &TableStore) {
    for (name, score) in [("GG Meade", 3701), ("US Grant", 4242), ("GB McClellan", 107)] {
        let affected = store
            .insert("high_score", vec![name.into(), score.into()])
            .unwrap();
        assert_eq!(affected, 1);
    }
}

/// Collapse (TEXT, INTEGER) rows into comparable pairs.
fn as_pairs(rows: Vec<Row>) -> Vec<(String, i32)> {
    rows.into_iter()
        .map(|row| match &row[..] {
            [Value::Text(name), Value::Integer(score)] => (name.clone(), *score),
            other => panic!("unexpected row shape: {other:?}"),
        })
        .collect()
}

#[test]
fn define_twice_is_rejected_and_preserves_data() {
    let (store, _dir) = temp_store();
    define_high_score(&store);
    insert_generals(&store);

    let err = store
        .define_schema(
            "high_score",
            vec![ColumnSpec::new("other", ColumnType::Real)],
        )
        .unwrap_err();
    assert!(matches!(err, SchemaError::AlreadyExists { table } if table == "high_score"));

    // First declaration and its data survive untouched.
    let rows = store.query_top("high_score", "score", 10).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(as_pairs(rows)[0], ("US Grant".to_string(), 4242));
}

#[test]
fn insert_into_undeclared_table_fails() {
    let (store, _dir) = temp_store();

    let err = store
        .insert("missing", vec!["x".into(), 1.into()])
        .unwrap_err();
    assert!(matches!(err, InsertError::UnknownTable { table } if table == "missing"));
}

#[test]
fn insert_with_wrong_arity_fails_without_writing() {
    let (store, _dir) = temp_store();
    define_high_score(&store);

    let err = store
        .insert("high_score", vec!["x".into(), 1.into(), 2.into()])
        .unwrap_err();
    assert!(matches!(
        err,
        InsertError::ArityMismatch {
            expected: 2,
            actual: 3,
            ..
        }
    ));

    assert!(store.query_top("high_score", "score", 10).unwrap().is_empty());
}

#[test]
fn round_trip_supported_types() {
    let (store, _dir) = temp_store();
    store
        .define_schema(
            "samples",
            vec![
                ColumnSpec::new("id", ColumnType::Integer),
                ColumnSpec::new("ratio", ColumnType::Real),
                ColumnSpec::new("label", ColumnType::Text),
            ],
        )
        .unwrap();

    store
        .insert("samples", vec![7.into(), 2.5f32.into(), "seven".into()])
        .unwrap();

    let rows = store.query_top("samples", "id", 1).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0][..],
        [
            Value::Integer(7),
            Value::Real(2.5),
            Value::Text("seven".to_string())
        ]
    );
}

#[test]
fn query_orders_descending_and_limits() {
    let (store, _dir) = temp_store();
    define_high_score(&store);
    insert_generals(&store);

    let rows = store.query_top("high_score", "score", 2).unwrap();
    assert_eq!(
        as_pairs(rows),
        [
            ("US Grant".to_string(), 4242),
            ("GG Meade".to_string(), 3701)
        ]
    );
}

#[test]
fn query_unknown_order_column_fails() {
    let (store, _dir) = temp_store();
    define_high_score(&store);

    let err = store.query_top("high_score", "rank", 10).unwrap_err();
    assert!(matches!(
        err,
        QueryError::UnknownColumn { table, column }
            if table == "high_score" && column == "rank"
    ));

    let err = store.query_top("missing", "score", 10).unwrap_err();
    assert!(matches!(err, QueryError::UnknownTable { table } if table == "missing"));
}

#[test]
fn repeated_query_is_idempotent() {
    let (store, _dir) = temp_store();
    define_high_score(&store);
    insert_generals(&store);

    let first = store.query_top("high_score", "score", 10).unwrap();
    let second = store.query_top("high_score", "score", 10).unwrap();
    assert_eq!(first, second);
}

#[test]
fn limit_zero_yields_no_rows() {
    let (store, _dir) = temp_store();
    define_high_score(&store);
    insert_generals(&store);

    assert!(store.query_top("high_score", "score", 0).unwrap().is_empty());
}

#[test]
fn blob_column_decodes_as_unsupported() {
    let (store, _dir) = temp_store();
    store
        .define_schema(
            "attachments",
            vec![
                ColumnSpec::new("id", ColumnType::Integer),
                ColumnSpec::new("payload", ColumnType::Blob),
            ],
        )
        .unwrap();

    store
        .insert("attachments", vec![1.into(), vec![0xde, 0xad].into()])
        .unwrap();

    let rows = store.query_top("attachments", "id", 1).unwrap();
    assert_eq!(rows[0][..], [Value::Integer(1), Value::Unsupported]);
}

#[test]
fn null_into_not_null_column_is_an_engine_failure() {
    let (store, _dir) = temp_store();
    define_high_score(&store);

    let err = store
        .insert("high_score", vec![Value::Null, 1.into()])
        .unwrap_err();
    assert!(matches!(err, InsertError::EngineFailure(_)));

    assert!(store.query_top("high_score", "score", 10).unwrap().is_empty());
}

#[test]
fn invalid_identifiers_are_rejected_locally() {
    let (store, _dir) = temp_store();

    for table in ["", "has space", "semi;colon", "2fast", "x\"y"] {
        let err = store
            .define_schema(table, vec![ColumnSpec::new("a", ColumnType::Integer)])
            .unwrap_err();
        assert!(
            matches!(err, SchemaError::InvalidIdentifier { .. }),
            "{table:?} should be rejected"
        );
    }

    let err = store
        .define_schema(
            "ok",
            vec![ColumnSpec::new("bad name", ColumnType::Integer)],
        )
        .unwrap_err();
    assert!(matches!(err, SchemaError::InvalidIdentifier { name } if name == "bad name"));

    // Nothing was registered along the way.
    let err = store.insert("ok", vec![1.into()]).unwrap_err();
    assert!(matches!(err, InsertError::UnknownTable { .. }));
}

#[test]
fn empty_and_duplicate_columns_are_rejected() {
    let (store, _dir) = temp_store();

    let err = store.define_schema("empty", vec![]).unwrap_err();
    assert!(matches!(err, SchemaError::NoColumns { .. }));

    let err = store
        .define_schema(
            "dup",
            vec![
                ColumnSpec::new("a", ColumnType::Integer),
                ColumnSpec::new("a", ColumnType::Text),
            ],
        )
        .unwrap_err();
    assert!(matches!(err, SchemaError::DuplicateColumn { column, .. } if column == "a"));
}

#[test]
fn bound_values_are_inert_sql() {
    let (store, _dir) = temp_store();
    define_high_score(&store);

    let hostile = "Robert'; DROP TABLE \"high_score\"; --";
    store
        .insert("high_score", vec![hostile.into(), 1.into()])
        .unwrap();

    // The table survived and the value came back byte for byte.
    let rows = store.query_top("high_score", "score", 10).unwrap();
    assert_eq!(as_pairs(rows), [(hostile.to_string(), 1)]);
}

#[test]
fn scan_break_releases_the_cursor() {
    let (store, _dir) = temp_store();
    define_high_score(&store);
    insert_generals(&store);

    let mut seen = Vec::new();
    store
        .scan_top("high_score", "score", 10, |row| {
            seen.push(row);
            ControlFlow::Break(())
        })
        .unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(as_pairs(seen)[0], ("US Grant".to_string(), 4242));

    // Abandoning the scan early must not wedge the database file.
    store
        .insert("high_score", vec!["AE Burnside".into(), 240.into()])
        .unwrap();
    assert_eq!(store.query_top("high_score", "score", 10).unwrap().len(), 4);
}

#[test]
fn registry_is_per_store_and_rebuilt_by_declaration() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("test.db");

    {
        let store = TableStore::new(&path);
        define_high_score(&store);
        insert_generals(&store);
    }

    // A fresh store on the same file knows nothing until told.
    let store = TableStore::new(&path);
    let err = store.query_top("high_score", "score", 10).unwrap_err();
    assert!(matches!(err, QueryError::UnknownTable { .. }));

    // Re-declaring is CREATE IF NOT EXISTS: the existing rows survive.
    define_high_score(&store);
    let rows = store.query_top("high_score", "score", 10).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(as_pairs(rows)[0], ("US Grant".to_string(), 4242));
}
