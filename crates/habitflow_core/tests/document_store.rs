use habitflow_core::db::{open_db, open_db_in_memory};
use habitflow_core::store::{
    Collection, Direction, DocumentPatch, DocumentStore, FilterOp, FixedClock, Query,
    SqliteDocumentStore, StoreError, WriteBatch,
};
use rusqlite::Connection;
use serde_json::{json, Value};
use std::sync::{Arc, Barrier};
use std::thread;

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn store_at(conn: &Connection, now_ms: i64) -> (SqliteDocumentStore<'_>, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::new(now_ms));
    let store = SqliteDocumentStore::with_clock(conn, clock.clone()).unwrap();
    (store, clock)
}

#[test]
fn try_new_requires_migrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteDocumentStore::try_new(&conn).err().unwrap();
    assert!(matches!(err, StoreError::MissingRequiredTable("documents")));
}

#[test]
fn add_generates_ids_and_resolves_server_timestamps() {
    let conn = setup();
    let (store, _) = store_at(&conn, 1_000);

    let patch = DocumentPatch::new()
        .set("name", "Read daily")
        .server_timestamp("createdAt");
    let first = store.add(Collection::Goals, &patch).unwrap();
    let second = store.add(Collection::Goals, &patch).unwrap();
    assert_ne!(first, second);

    let loaded = store.get(Collection::Goals, &first).unwrap().unwrap();
    assert_eq!(loaded.get("name"), Some(&json!("Read daily")));
    assert_eq!(loaded.get("createdAt"), Some(&json!(1_000)));
}

#[test]
fn collections_are_isolated() {
    let conn = setup();
    let (store, _) = store_at(&conn, 0);

    store
        .set(Collection::Habits, "same", &DocumentPatch::new().set("k", 1), false)
        .unwrap();
    assert!(store.get(Collection::Tasks, "same").unwrap().is_none());
}

#[test]
fn set_without_merge_replaces_and_with_merge_keeps_other_fields() {
    let conn = setup();
    let (store, _) = store_at(&conn, 0);
    let base = DocumentPatch::new().set("a", 1).set("b", 2);
    store.set(Collection::Tasks, "t1", &base, false).unwrap();

    store
        .set(Collection::Tasks, "t1", &DocumentPatch::new().set("b", 3), true)
        .unwrap();
    let merged = store.get(Collection::Tasks, "t1").unwrap().unwrap();
    assert_eq!(merged.get("a"), Some(&json!(1)));
    assert_eq!(merged.get("b"), Some(&json!(3)));

    store
        .set(Collection::Tasks, "t1", &DocumentPatch::new().set("c", 4), false)
        .unwrap();
    let replaced = store.get(Collection::Tasks, "t1").unwrap().unwrap();
    assert_eq!(replaced.fields.len(), 1);
    assert_eq!(replaced.get("c"), Some(&json!(4)));
}

#[test]
fn update_missing_document_is_not_found() {
    let conn = setup();
    let (store, _) = store_at(&conn, 0);

    let err = store
        .update(Collection::Goals, "nope", &DocumentPatch::new().set("x", 1))
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::NotFound { collection: Collection::Goals, ref id } if id == "nope"
    ));
    assert!(store.get(Collection::Goals, "nope").unwrap().is_none());
}

#[test]
fn delete_is_a_no_op_for_absent_documents() {
    let conn = setup();
    let (store, _) = store_at(&conn, 0);

    store.delete(Collection::Goals, "never-existed").unwrap();
    store
        .set(Collection::Goals, "g1", &DocumentPatch::new().set("x", 1), false)
        .unwrap();
    store.delete(Collection::Goals, "g1").unwrap();
    store.delete(Collection::Goals, "g1").unwrap();
    assert!(store.get(Collection::Goals, "g1").unwrap().is_none());
}

#[test]
fn query_filters_by_equality_null_and_range() {
    let conn = setup();
    let (store, _) = store_at(&conn, 0);
    let docs = [
        ("a", json!({ "userId": "u1", "goalId": "g1", "rank": 3 })),
        ("b", json!({ "userId": "u1", "goalId": null, "rank": 1 })),
        ("c", json!({ "userId": "u2", "goalId": "g1", "rank": 2 })),
        ("d", json!({ "userId": "u1", "rank": 5 })),
    ];
    for (id, body) in docs {
        let patch = DocumentPatch::from_fields(body.as_object().cloned().unwrap());
        store.set(Collection::Habits, id, &patch, false).unwrap();
    }

    let linked = store
        .query(Collection::Habits, &Query::new().where_eq("goalId", "g1"))
        .unwrap();
    assert_eq!(ids(&linked), vec!["a", "c"]);

    let unlinked = store
        .query(Collection::Habits, &Query::new().where_eq("goalId", Value::Null))
        .unwrap();
    assert_eq!(ids(&unlinked), vec!["b"]);

    let ranked = store
        .query(
            Collection::Habits,
            &Query::new()
                .where_eq("userId", "u1")
                .filter("rank", FilterOp::Gte, 3)
                .order_by("rank", Direction::Desc),
        )
        .unwrap();
    assert_eq!(ids(&ranked), vec!["d", "a"]);
}

#[test]
fn query_orders_ties_by_id_and_applies_limit() {
    let conn = setup();
    let (store, _) = store_at(&conn, 0);
    for id in ["z", "m", "a"] {
        store
            .set(Collection::Tasks, id, &DocumentPatch::new().set("dueDate", 10), false)
            .unwrap();
    }

    let ordered = store
        .query(
            Collection::Tasks,
            &Query::new().order_by("dueDate", Direction::Asc).limit(2),
        )
        .unwrap();
    assert_eq!(ids(&ordered), vec!["a", "m"]);
}

#[test]
fn boolean_fields_are_queryable() {
    let conn = setup();
    let (store, _) = store_at(&conn, 0);
    store
        .set(Collection::HabitLogs, "l1", &DocumentPatch::new().set("isCompleted", true), false)
        .unwrap();
    store
        .set(Collection::HabitLogs, "l2", &DocumentPatch::new().set("isCompleted", false), false)
        .unwrap();

    let done = store
        .query(Collection::HabitLogs, &Query::new().where_eq("isCompleted", true))
        .unwrap();
    assert_eq!(ids(&done), vec!["l1"]);
}

#[test]
fn commit_applies_every_write_with_one_timestamp() {
    let conn = setup();
    let (store, clock) = store_at(&conn, 100);
    store
        .set(Collection::Habits, "h1", &DocumentPatch::new().set("goalId", "g1"), false)
        .unwrap();
    store
        .set(Collection::SwotAnalyses, "s1", &DocumentPatch::new().set("goalId", "g1"), false)
        .unwrap();

    clock.set(500);
    let mut batch = WriteBatch::new();
    batch
        .update(
            Collection::Habits,
            "h1",
            DocumentPatch::new()
                .set("goalId", Value::Null)
                .server_timestamp("updatedAt"),
        )
        .delete(Collection::SwotAnalyses, "s1")
        .set(
            Collection::Goals,
            "g2",
            DocumentPatch::new().server_timestamp("createdAt"),
            false,
        );
    assert_eq!(batch.len(), 3);
    store.commit(batch).unwrap();

    let habit = store.get(Collection::Habits, "h1").unwrap().unwrap();
    assert_eq!(habit.get("goalId"), Some(&Value::Null));
    assert_eq!(habit.get("updatedAt"), Some(&json!(500)));
    assert!(store.get(Collection::SwotAnalyses, "s1").unwrap().is_none());
    let goal = store.get(Collection::Goals, "g2").unwrap().unwrap();
    assert_eq!(goal.get("createdAt"), Some(&json!(500)));
}

#[test]
fn failed_write_rolls_back_the_whole_batch() {
    let conn = setup();
    let (store, _) = store_at(&conn, 0);
    store
        .set(Collection::Habits, "h1", &DocumentPatch::new().set("goalId", "g1"), false)
        .unwrap();
    store
        .set(Collection::Goals, "g1", &DocumentPatch::new().set("name", "x"), false)
        .unwrap();

    let mut batch = WriteBatch::new();
    batch
        .update(
            Collection::Habits,
            "h1",
            DocumentPatch::new().set("goalId", Value::Null),
        )
        .delete(Collection::Goals, "g1")
        .update(Collection::Tasks, "missing", DocumentPatch::new().set("x", 1));

    let err = store.commit(batch).unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));

    let habit = store.get(Collection::Habits, "h1").unwrap().unwrap();
    assert_eq!(habit.get("goalId"), Some(&json!("g1")));
    assert!(store.get(Collection::Goals, "g1").unwrap().is_some());
}

#[test]
fn malformed_stored_document_is_invalid_data() {
    let conn = setup();
    conn.execute(
        "INSERT INTO documents (collection, doc_id, body) VALUES ('goals', 'g1', '{\"name\": 1}');",
        [],
    )
    .unwrap();
    let (store, _) = store_at(&conn, 0);

    let raw = store.get(Collection::Goals, "g1").unwrap().unwrap();
    let err = habitflow_core::store::codec::decode::<habitflow_core::Goal>(raw).unwrap_err();
    assert!(matches!(err, StoreError::InvalidData(_)));
}

#[test]
fn patches_with_unusable_field_names_are_rejected() {
    let conn = setup();
    let (store, _) = store_at(&conn, 0);

    let err = store
        .add(Collection::Goals, &DocumentPatch::new().set("a.b", 1))
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidQuery(_)));
}

fn ids(documents: &[habitflow_core::Document]) -> Vec<&str> {
    documents.iter().map(|doc| doc.id.as_str()).collect()
}

#[test]
fn concurrent_merges_from_two_connections_keep_both_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("habitflow.sqlite3");
    let conn = open_db(&path).unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    store
        .set(Collection::Habits, "h1", &DocumentPatch::new().set("name", "Walk"), false)
        .unwrap();

    let barrier = Arc::new(Barrier::new(2));
    let writers = ["left", "right"]
        .into_iter()
        .map(|field| {
            let path = path.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let conn = open_db(&path).unwrap();
                let store = SqliteDocumentStore::try_new(&conn).unwrap();
                barrier.wait();
                for count in 0..100 {
                    let patch = DocumentPatch::new().set(field, count);
                    store.update(Collection::Habits, "h1", &patch).unwrap();
                }
            })
        })
        .collect::<Vec<_>>();
    for writer in writers {
        writer.join().unwrap();
    }

    let merged = store.get(Collection::Habits, "h1").unwrap().unwrap();
    assert_eq!(merged.get("name"), Some(&json!("Walk")));
    assert_eq!(merged.get("left"), Some(&json!(99)));
    assert_eq!(merged.get("right"), Some(&json!(99)));
}
