//! Translation boundary between stored documents and typed entities.
//!
//! # Invariants
//! - The document id is injected as the entity's `id` field on decode and
//!   never persisted inside the document body.
//! - Decode failures surface as `StoreError::InvalidData`, never defaults.

use crate::store::document::{Document, Fields};
use crate::store::{StoreError, StoreResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

const ID_FIELD: &str = "id";

/// Decodes one document into a typed entity.
pub fn decode<T: DeserializeOwned>(document: Document) -> StoreResult<T> {
    let Document { id, mut fields } = document;
    fields.insert(ID_FIELD.to_string(), Value::String(id.clone()));
    serde_json::from_value(Value::Object(fields)).map_err(|err| {
        StoreError::InvalidData(format!("document `{id}` does not decode: {err}"))
    })
}

/// Decodes every document, failing on the first malformed one.
pub fn decode_all<T: DeserializeOwned>(documents: Vec<Document>) -> StoreResult<Vec<T>> {
    documents.into_iter().map(decode).collect()
}

/// Encodes an entity into document fields, dropping its `id`.
pub fn encode<T: Serialize>(entity: &T) -> StoreResult<Fields> {
    match serde_json::to_value(entity) {
        Ok(Value::Object(mut fields)) => {
            fields.remove(ID_FIELD);
            Ok(fields)
        }
        Ok(other) => Err(StoreError::InvalidData(format!(
            "entity encodes to non-object value `{other}`"
        ))),
        Err(err) => Err(StoreError::InvalidData(format!(
            "entity does not encode: {err}"
        ))),
    }
}
