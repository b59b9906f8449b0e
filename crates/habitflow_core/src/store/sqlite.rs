//! SQLite-backed document store.
//!
//! # Responsibility
//! - Persist documents as JSON objects in the `documents` table.
//! - Translate structured queries into `json_extract` predicates.
//! - Apply write batches inside one SQLite transaction.
//!
//! # Invariants
//! - Field names are validated before they are spliced into JSON paths.
//! - A failed write inside `commit` rolls back every earlier write of the batch.
//! - Every write takes the write lock up front (`BEGIN IMMEDIATE`), so a
//!   merge never works on a body another connection is about to replace and
//!   lock contention waits on the busy timeout instead of failing.

use crate::store::batch::{Write, WriteBatch};
use crate::store::clock::{Clock, SystemClock};
use crate::store::document::{Collection, Document, DocumentId, DocumentPatch, Fields};
use crate::store::query::{is_valid_field_name, Direction, FilterOp, Query};
use crate::store::{DocumentStore, StoreError, StoreResult};
use log::{debug, error, info};
use rusqlite::types::Value as SqlValue;
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Transaction, TransactionBehavior,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

const DOCUMENTS_TABLE: &str = "documents";

/// Document store over a migrated SQLite connection.
#[derive(Clone)]
pub struct SqliteDocumentStore<'conn> {
    conn: &'conn Connection,
    clock: Arc<dyn Clock>,
}

impl<'conn> SqliteDocumentStore<'conn> {
    /// Builds a store using the wall clock for server timestamps.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        Self::with_clock(conn, Arc::new(SystemClock))
    }

    /// Builds a store with a caller-provided clock.
    pub fn with_clock(conn: &'conn Connection, clock: Arc<dyn Clock>) -> StoreResult<Self> {
        ensure_documents_table(conn)?;
        Ok(Self { conn, clock })
    }

    fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    fn begin_write(&self) -> StoreResult<Transaction<'conn>> {
        Ok(Transaction::new_unchecked(
            self.conn,
            TransactionBehavior::Immediate,
        )?)
    }

    /// Runs one single-document write under the write lock.
    fn write_locked<T>(
        &self,
        write: impl FnOnce(&Connection) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let tx = self.begin_write()?;
        let written = write(&*tx)?;
        tx.commit()?;
        Ok(written)
    }
}

impl DocumentStore for SqliteDocumentStore<'_> {
    fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>> {
        Ok(load_fields(self.conn, collection, id)?.map(|fields| Document::new(id, fields)))
    }

    fn add(&self, collection: Collection, patch: &DocumentPatch) -> StoreResult<DocumentId> {
        validate_patch(patch)?;
        let id = Uuid::new_v4().simple().to_string();
        let fields = patch.resolve(self.now_ms());
        self.write_locked(|conn| store_fields(conn, collection, &id, &fields))?;
        debug!("event=doc_add module=store status=ok collection={collection}");
        Ok(id)
    }

    fn set(
        &self,
        collection: Collection,
        id: &str,
        patch: &DocumentPatch,
        merge: bool,
    ) -> StoreResult<()> {
        let now_ms = self.now_ms();
        self.write_locked(|conn| apply_set(conn, collection, id, patch, merge, now_ms))
    }

    fn update(&self, collection: Collection, id: &str, patch: &DocumentPatch) -> StoreResult<()> {
        let now_ms = self.now_ms();
        self.write_locked(|conn| apply_update(conn, collection, id, patch, now_ms))
    }

    fn delete(&self, collection: Collection, id: &str) -> StoreResult<()> {
        apply_delete(self.conn, collection, id)
    }

    fn query(&self, collection: Collection, query: &Query) -> StoreResult<Vec<Document>> {
        let (sql, bind_values) = build_query_sql(collection, query)?;
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut documents = Vec::new();
        while let Some(row) = rows.next()? {
            let id: String = row.get("doc_id")?;
            let body: String = row.get("body")?;
            let fields = parse_body(collection, &id, &body)?;
            documents.push(Document::new(id, fields));
        }
        Ok(documents)
    }

    fn commit(&self, batch: WriteBatch) -> StoreResult<()> {
        let started_at = Instant::now();
        let now_ms = self.now_ms();
        let tx = self.begin_write()?;

        for write in batch.writes() {
            let applied = match write {
                Write::Set {
                    collection,
                    id,
                    patch,
                    merge,
                } => apply_set(&tx, *collection, id, patch, *merge, now_ms),
                Write::Update {
                    collection,
                    id,
                    patch,
                } => apply_update(&tx, *collection, id, patch, now_ms),
                Write::Delete { collection, id } => apply_delete(&tx, *collection, id),
            };
            if let Err(err) = applied {
                error!(
                    "event=batch_commit module=store status=error writes={} duration_ms={} error={}",
                    batch.len(),
                    started_at.elapsed().as_millis(),
                    err
                );
                // Dropping `tx` rolls back every write applied so far.
                return Err(err);
            }
        }

        tx.commit()?;
        info!(
            "event=batch_commit module=store status=ok writes={} duration_ms={}",
            batch.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }
}

fn apply_set(
    conn: &Connection,
    collection: Collection,
    id: &str,
    patch: &DocumentPatch,
    merge: bool,
    now_ms: i64,
) -> StoreResult<()> {
    validate_patch(patch)?;
    let resolved = patch.resolve(now_ms);
    let fields = if merge {
        let mut existing = load_fields(conn, collection, id)?.unwrap_or_default();
        existing.extend(resolved);
        existing
    } else {
        resolved
    };
    store_fields(conn, collection, id, &fields)
}

fn apply_update(
    conn: &Connection,
    collection: Collection,
    id: &str,
    patch: &DocumentPatch,
    now_ms: i64,
) -> StoreResult<()> {
    validate_patch(patch)?;
    let mut existing =
        load_fields(conn, collection, id)?.ok_or_else(|| StoreError::NotFound {
            collection,
            id: id.to_string(),
        })?;
    existing.extend(patch.resolve(now_ms));
    store_fields(conn, collection, id, &existing)
}

fn apply_delete(conn: &Connection, collection: Collection, id: &str) -> StoreResult<()> {
    conn.execute(
        "DELETE FROM documents WHERE collection = ?1 AND doc_id = ?2;",
        params![collection.as_str(), id],
    )?;
    Ok(())
}

fn load_fields(conn: &Connection, collection: Collection, id: &str) -> StoreResult<Option<Fields>> {
    let body: Option<String> = conn
        .query_row(
            "SELECT body FROM documents WHERE collection = ?1 AND doc_id = ?2;",
            params![collection.as_str(), id],
            |row| row.get(0),
        )
        .optional()?;

    body.map(|body| parse_body(collection, id, &body))
        .transpose()
}

fn store_fields(
    conn: &Connection,
    collection: Collection,
    id: &str,
    fields: &Fields,
) -> StoreResult<()> {
    let body = serde_json::to_string(fields).map_err(|err| {
        StoreError::InvalidData(format!("document {collection}/{id} does not serialize: {err}"))
    })?;
    conn.execute(
        "INSERT INTO documents (collection, doc_id, body)
         VALUES (?1, ?2, ?3)
         ON CONFLICT (collection, doc_id) DO UPDATE SET body = excluded.body;",
        params![collection.as_str(), id, body],
    )?;
    Ok(())
}

fn parse_body(collection: Collection, id: &str, body: &str) -> StoreResult<Fields> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(StoreError::InvalidData(format!(
            "document {collection}/{id} body is not an object"
        ))),
        Err(err) => Err(StoreError::InvalidData(format!(
            "document {collection}/{id} body is not valid JSON: {err}"
        ))),
    }
}

fn validate_patch(patch: &DocumentPatch) -> StoreResult<()> {
    if let Some(field) = patch.field_names().find(|field| !is_valid_field_name(field)) {
        return Err(StoreError::InvalidQuery(format!(
            "unsupported field name `{field}`"
        )));
    }
    Ok(())
}

fn build_query_sql(collection: Collection, query: &Query) -> StoreResult<(String, Vec<SqlValue>)> {
    let mut sql = String::from(
        "SELECT doc_id, body
         FROM documents
         WHERE collection = ?",
    );
    let mut bind_values = vec![SqlValue::Text(collection.as_str().to_string())];

    for predicate in &query.predicates {
        let path = json_path(&predicate.field)?;
        match (&predicate.value, predicate.op) {
            (Value::Null, FilterOp::Eq) => {
                sql.push_str(&format!(" AND json_type(body, '{path}') = 'null'"));
            }
            (Value::Null, op) => {
                return Err(StoreError::InvalidQuery(format!(
                    "null is only comparable with `=`, got `{}`",
                    op.as_sql()
                )));
            }
            (value, op) => {
                sql.push_str(&format!(
                    " AND json_extract(body, '{path}') {} ?",
                    op.as_sql()
                ));
                bind_values.push(to_sql_value(&predicate.field, value)?);
            }
        }
    }

    match &query.order_by {
        Some(order) => {
            let path = json_path(&order.field)?;
            let direction = match order.direction {
                Direction::Asc => "ASC",
                Direction::Desc => "DESC",
            };
            sql.push_str(&format!(
                " ORDER BY json_extract(body, '{path}') {direction}, doc_id ASC"
            ));
        }
        None => sql.push_str(" ORDER BY doc_id ASC"),
    }

    if let Some(limit) = query.limit {
        sql.push_str(" LIMIT ?");
        bind_values.push(SqlValue::Integer(i64::from(limit)));
    }

    Ok((sql, bind_values))
}

fn json_path(field: &str) -> StoreResult<String> {
    if !is_valid_field_name(field) {
        return Err(StoreError::InvalidQuery(format!(
            "unsupported field name `{field}`"
        )));
    }
    Ok(format!("$.{field}"))
}

fn to_sql_value(field: &str, value: &Value) -> StoreResult<SqlValue> {
    match value {
        // json_extract yields 1/0 for JSON booleans.
        Value::Bool(flag) => Ok(SqlValue::Integer(i64::from(*flag))),
        Value::Number(number) => {
            if let Some(integer) = number.as_i64() {
                Ok(SqlValue::Integer(integer))
            } else if let Some(real) = number.as_f64() {
                Ok(SqlValue::Real(real))
            } else {
                Err(StoreError::InvalidQuery(format!(
                    "number for `{field}` is out of range"
                )))
            }
        }
        Value::String(text) => Ok(SqlValue::Text(text.clone())),
        Value::Null | Value::Array(_) | Value::Object(_) => Err(StoreError::InvalidQuery(
            format!("`{field}` can only be compared with scalar values"),
        )),
    }
}

fn ensure_documents_table(conn: &Connection) -> StoreResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [DOCUMENTS_TABLE],
        |row| row.get(0),
    )?;
    if exists == 1 {
        Ok(())
    } else {
        Err(StoreError::MissingRequiredTable(DOCUMENTS_TABLE))
    }
}
