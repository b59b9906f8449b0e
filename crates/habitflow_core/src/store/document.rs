//! Untyped document representation.

use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// Opaque document identifier within one collection.
pub type DocumentId = String;

/// Top-level document fields.
pub type Fields = Map<String, Value>;

/// Flat collections known to the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Users,
    Goals,
    Habits,
    HabitLogs,
    Tasks,
    TaskLists,
    SwotAnalyses,
}

impl Collection {
    /// Stable collection name used in storage.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Goals => "goals",
            Self::Habits => "habits",
            Self::HabitLogs => "habitLogs",
            Self::Tasks => "tasks",
            Self::TaskLists => "taskLists",
            Self::SwotAnalyses => "swotAnalyses",
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stored document: its id plus the field map.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<DocumentId>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Returns one top-level field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

/// A set of top-level field writes.
///
/// Fields marked with [`DocumentPatch::server_timestamp`] are filled in by
/// the store at write time, so every write of one batch shares one instant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentPatch {
    fields: Fields,
    server_timestamps: BTreeSet<String>,
}

impl DocumentPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a patch writing every field of `fields`.
    pub fn from_fields(fields: Fields) -> Self {
        Self {
            fields,
            server_timestamps: BTreeSet::new(),
        }
    }

    /// Writes `value` into `field`, replacing any earlier value or marker.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    /// In-place variant of [`DocumentPatch::set`].
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        let field = field.into();
        self.server_timestamps.remove(&field);
        self.fields.insert(field, value.into());
    }

    /// Marks `field` to receive the store's current time in epoch ms.
    pub fn server_timestamp(mut self, field: impl Into<String>) -> Self {
        let field = field.into();
        self.fields.remove(&field);
        self.server_timestamps.insert(field);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.server_timestamps.is_empty()
    }

    /// Names of every field this patch writes.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields
            .keys()
            .map(String::as_str)
            .chain(self.server_timestamps.iter().map(String::as_str))
    }

    /// Materializes the patch with server timestamps resolved to `now_ms`.
    pub fn resolve(&self, now_ms: i64) -> Fields {
        let mut resolved = self.fields.clone();
        for field in &self.server_timestamps {
            resolved.insert(field.clone(), Value::from(now_ms));
        }
        resolved
    }
}
