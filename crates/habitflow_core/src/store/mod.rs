//! Document store capability and its SQLite implementation.
//!
//! # Responsibility
//! - Define the capability interface every entity service talks to.
//! - Keep the untyped document representation behind this boundary.
//!
//! # Invariants
//! - Collections are flat; documents are keyed by opaque string ids.
//! - `commit` applies a `WriteBatch` all-or-nothing.
//! - Deleting an absent document succeeds; updating one fails with `NotFound`.

pub mod batch;
pub mod clock;
pub mod codec;
pub mod document;
pub mod query;
pub mod sqlite;

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use batch::{Write, WriteBatch};
pub use clock::{Clock, FixedClock, SystemClock};
pub use document::{Collection, Document, DocumentId, DocumentPatch, Fields};
pub use query::{Direction, FilterOp, OrderBy, Predicate, Query};
pub use sqlite::SqliteDocumentStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure of a store operation.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    NotFound {
        collection: Collection,
        id: DocumentId,
    },
    /// Persisted document could not be decoded into the expected shape.
    InvalidData(String),
    /// Query or patch refers to an unusable field or value.
    InvalidQuery(String),
    MissingRequiredTable(&'static str),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { collection, id } => {
                write!(f, "document not found: {collection}/{id}")
            }
            Self::InvalidData(message) => write!(f, "invalid document data: {message}"),
            Self::InvalidQuery(message) => write!(f, "invalid query: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "store schema is missing required table `{table}`")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Capability interface over a document database.
///
/// Implementations own the transport; services only translate typed
/// parameters into these calls.
pub trait DocumentStore {
    /// Reads one document, `None` when it does not exist.
    fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>>;

    /// Creates a document under a freshly generated id.
    fn add(&self, collection: Collection, patch: &DocumentPatch) -> StoreResult<DocumentId>;

    /// Writes a document. With `merge`, fields are merged into an existing
    /// document (created when absent); without it the document is replaced.
    fn set(
        &self,
        collection: Collection,
        id: &str,
        patch: &DocumentPatch,
        merge: bool,
    ) -> StoreResult<()>;

    /// Merges fields into an existing document.
    fn update(&self, collection: Collection, id: &str, patch: &DocumentPatch) -> StoreResult<()>;

    /// Removes a document. Absent documents are a no-op.
    fn delete(&self, collection: Collection, id: &str) -> StoreResult<()>;

    /// Lists documents matching every predicate, in query order.
    fn query(&self, collection: Collection, query: &Query) -> StoreResult<Vec<Document>>;

    /// Applies all staged writes as one atomic unit.
    fn commit(&self, batch: WriteBatch) -> StoreResult<()>;

    /// Starts an empty write batch.
    fn batch(&self) -> WriteBatch {
        WriteBatch::new()
    }
}

impl<S: DocumentStore + ?Sized> DocumentStore for &S {
    fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>> {
        (**self).get(collection, id)
    }

    fn add(&self, collection: Collection, patch: &DocumentPatch) -> StoreResult<DocumentId> {
        (**self).add(collection, patch)
    }

    fn set(
        &self,
        collection: Collection,
        id: &str,
        patch: &DocumentPatch,
        merge: bool,
    ) -> StoreResult<()> {
        (**self).set(collection, id, patch, merge)
    }

    fn update(&self, collection: Collection, id: &str, patch: &DocumentPatch) -> StoreResult<()> {
        (**self).update(collection, id, patch)
    }

    fn delete(&self, collection: Collection, id: &str) -> StoreResult<()> {
        (**self).delete(collection, id)
    }

    fn query(&self, collection: Collection, query: &Query) -> StoreResult<Vec<Document>> {
        (**self).query(collection, query)
    }

    fn commit(&self, batch: WriteBatch) -> StoreResult<()> {
        (**self).commit(batch)
    }
}
