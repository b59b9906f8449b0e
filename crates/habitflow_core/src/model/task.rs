//! Task entity.

use crate::model::fields;
use crate::model::goal::GoalId;
use crate::model::task_list::TaskListId;
use crate::model::user::UserId;
use crate::model::validation::{require_non_blank, ValidationError};
use crate::store::{DocumentId, DocumentPatch};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type TaskId = DocumentId;

/// Task lifecycle state. New tasks start `Open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Open,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value.trim().to_ascii_uppercase().as_str() {
            "OPEN" => Ok(Self::Open),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELLED" => Ok(Self::Cancelled),
            _ => Err(ValidationError::InvalidValue {
                field: "status",
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(Self::Low),
            "MEDIUM" => Ok(Self::Medium),
            "HIGH" => Ok(Self::High),
            _ => Err(ValidationError::InvalidValue {
                field: "priority",
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub user_id: UserId,
    pub task_list_id: Option<TaskListId>,
    /// Cleared when the referenced goal is deleted.
    pub goal_id: Option<GoalId>,
    pub title: String,
    pub description: String,
    pub due_date: i64,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub reminder_offset_minutes: Option<u32>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Input for creating a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub task_list_id: Option<TaskListId>,
    pub goal_id: Option<GoalId>,
    pub due_date: i64,
    pub priority: TaskPriority,
    pub reminder_offset_minutes: Option<u32>,
}

impl NewTask {
    /// Task with default priority and no references.
    pub fn new(title: impl Into<String>, due_date: i64) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            task_list_id: None,
            goal_id: None,
            due_date,
            priority: TaskPriority::default(),
            reminder_offset_minutes: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("title", &self.title)
    }
}

/// Partial task update; `None` leaves a field untouched, `Some(None)` clears
/// a nullable field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub task_list_id: Option<Option<TaskListId>>,
    pub goal_id: Option<Option<GoalId>>,
    pub due_date: Option<i64>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub reminder_offset_minutes: Option<Option<u32>>,
}

impl TaskPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(title) = &self.title {
            require_non_blank("title", title)?;
        }
        Ok(())
    }

    pub fn to_document_patch(&self) -> DocumentPatch {
        let mut patch = DocumentPatch::new();
        if let Some(title) = &self.title {
            patch.insert("title", title.as_str());
        }
        if let Some(description) = &self.description {
            patch.insert("description", description.as_str());
        }
        if let Some(task_list_id) = &self.task_list_id {
            patch.insert(fields::TASK_LIST_ID, nullable(task_list_id.clone()));
        }
        if let Some(goal_id) = &self.goal_id {
            patch.insert(fields::GOAL_ID, nullable(goal_id.clone()));
        }
        if let Some(due_date) = self.due_date {
            patch.insert(fields::DUE_DATE, due_date);
        }
        if let Some(status) = self.status {
            patch.insert(fields::STATUS, status.as_str());
        }
        if let Some(priority) = self.priority {
            patch.insert("priority", priority.as_str());
        }
        if let Some(offset) = self.reminder_offset_minutes {
            patch.insert(
                "reminderOffsetMinutes",
                offset.map_or(Value::Null, Value::from),
            );
        }
        patch
    }
}

/// Optional narrowing for task listings. Present filters are combined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub task_list_id: Option<TaskListId>,
    pub goal_id: Option<GoalId>,
    pub status: Option<TaskStatus>,
}

fn nullable(value: Option<String>) -> Value {
    value.map_or(Value::Null, Value::String)
}

#[cfg(test)]
mod tests {
    use super::{NewTask, TaskPatch, TaskPriority, TaskStatus};
    use serde_json::{json, Value};

    #[test]
    fn new_task_defaults_to_medium_priority() {
        let task = NewTask::new("Write report", 1_700_000_000_000);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert!(task.validate().is_ok());
        assert!(NewTask::new("  ", 0).validate().is_err());
    }

    #[test]
    fn status_codes_round_trip_through_parse() {
        for status in [
            TaskStatus::Open,
            TaskStatus::InProgress,
            TaskStatus::Completed,
            TaskStatus::Cancelled,
        ] {
            assert_eq!(TaskStatus::parse(status.as_str()).unwrap(), status);
        }
        assert_eq!(
            serde_json::to_value(TaskStatus::InProgress).unwrap(),
            json!("IN_PROGRESS")
        );
    }

    #[test]
    fn zero_reminder_offset_is_kept() {
        let patch = TaskPatch {
            reminder_offset_minutes: Some(Some(0)),
            task_list_id: Some(None),
            ..TaskPatch::default()
        };
        let fields = patch.to_document_patch().resolve(0);
        assert_eq!(fields.get("reminderOffsetMinutes"), Some(&json!(0)));
        assert_eq!(fields.get("taskListId"), Some(&Value::Null));
    }
}
