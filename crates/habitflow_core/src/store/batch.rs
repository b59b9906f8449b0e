//! Staged writes for atomic commit.

use crate::store::document::{Collection, DocumentId, DocumentPatch};

/// One staged write.
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    Set {
        collection: Collection,
        id: DocumentId,
        patch: DocumentPatch,
        merge: bool,
    },
    Update {
        collection: Collection,
        id: DocumentId,
        patch: DocumentPatch,
    },
    Delete {
        collection: Collection,
        id: DocumentId,
    },
}

/// Ordered list of writes committed as one unit by
/// [`super::DocumentStore::commit`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    writes: Vec<Write>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(
        &mut self,
        collection: Collection,
        id: impl Into<DocumentId>,
        patch: DocumentPatch,
        merge: bool,
    ) -> &mut Self {
        self.writes.push(Write::Set {
            collection,
            id: id.into(),
            patch,
            merge,
        });
        self
    }

    pub fn update(
        &mut self,
        collection: Collection,
        id: impl Into<DocumentId>,
        patch: DocumentPatch,
    ) -> &mut Self {
        self.writes.push(Write::Update {
            collection,
            id: id.into(),
            patch,
        });
        self
    }

    pub fn delete(&mut self, collection: Collection, id: impl Into<DocumentId>) -> &mut Self {
        self.writes.push(Write::Delete {
            collection,
            id: id.into(),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn writes(&self) -> &[Write] {
        &self.writes
    }
}
