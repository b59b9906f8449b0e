//! Task list entity.

use crate::model::user::UserId;
use crate::model::validation::{require_non_blank, ValidationError};
use crate::store::{DocumentId, DocumentPatch};
use serde::{Deserialize, Serialize};

pub type TaskListId = DocumentId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskList {
    pub id: TaskListId,
    pub user_id: UserId,
    pub name: String,
    pub description: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTaskList {
    pub name: String,
    pub description: String,
}

impl NewTaskList {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("name", &self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl TaskListPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.name {
            Some(name) => require_non_blank("name", name),
            None => Ok(()),
        }
    }

    pub fn to_document_patch(&self) -> DocumentPatch {
        let mut patch = DocumentPatch::new();
        if let Some(name) = &self.name {
            patch.insert("name", name.as_str());
        }
        if let Some(description) = &self.description {
            patch.insert("description", description.as_str());
        }
        patch
    }
}
