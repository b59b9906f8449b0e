//! Goal entity.

use crate::model::fields;
use crate::model::user::UserId;
use crate::model::validation::{check_date_range, require_non_blank, ValidationError};
use crate::store::{DocumentId, DocumentPatch};
use serde::{Deserialize, Serialize};

pub type GoalId = DocumentId;

/// Goal lifecycle state. New goals start `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GoalStatus {
    Active,
    Completed,
    Archived,
}

impl GoalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Completed => "COMPLETED",
            Self::Archived => "ARCHIVED",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(Self::Active),
            "COMPLETED" => Ok(Self::Completed),
            "ARCHIVED" => Ok(Self::Archived),
            _ => Err(ValidationError::InvalidValue {
                field: "status",
                value: value.to_string(),
            }),
        }
    }
}

/// A user-defined objective that habits, tasks and SWOT analyses attach to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: GoalId,
    pub user_id: UserId,
    pub name: String,
    pub description: String,
    pub start_date: i64,
    pub end_date: i64,
    pub status: GoalStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Input for creating a goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGoal {
    pub name: String,
    pub description: String,
    pub start_date: i64,
    pub end_date: i64,
}

impl NewGoal {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("name", &self.name)?;
        check_date_range(self.start_date, self.end_date)
    }
}

/// Partial goal update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoalPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<i64>,
    pub end_date: Option<i64>,
    pub status: Option<GoalStatus>,
}

impl GoalPatch {
    /// Checks fields that can be judged without the stored goal.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            require_non_blank("name", name)?;
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            check_date_range(start, end)?;
        }
        Ok(())
    }

    /// True when only one side of the date range changes, so the stored
    /// goal is needed to check the range.
    pub fn needs_stored_range(&self) -> bool {
        self.start_date.is_some() != self.end_date.is_some()
    }

    pub fn to_document_patch(&self) -> DocumentPatch {
        let mut patch = DocumentPatch::new();
        if let Some(name) = &self.name {
            patch.insert("name", name.as_str());
        }
        if let Some(description) = &self.description {
            patch.insert("description", description.as_str());
        }
        if let Some(start_date) = self.start_date {
            patch.insert("startDate", start_date);
        }
        if let Some(end_date) = self.end_date {
            patch.insert("endDate", end_date);
        }
        if let Some(status) = self.status {
            patch.insert(fields::STATUS, status.as_str());
        }
        patch
    }
}

#[cfg(test)]
mod tests {
    use super::{GoalPatch, GoalStatus, NewGoal};
    use crate::model::validation::ValidationError;
    use serde_json::json;

    #[test]
    fn status_uses_upper_case_codes() {
        assert_eq!(
            serde_json::to_value(GoalStatus::Completed).unwrap(),
            json!("COMPLETED")
        );
        assert_eq!(GoalStatus::parse("archived").unwrap(), GoalStatus::Archived);
        assert!(GoalStatus::parse("DONE").is_err());
    }

    #[test]
    fn new_goal_rejects_reversed_range() {
        let goal = NewGoal {
            name: "Run a marathon".to_string(),
            description: String::new(),
            start_date: 2_000,
            end_date: 1_000,
        };
        assert_eq!(
            goal.validate(),
            Err(ValidationError::DateRangeReversed {
                start: 2_000,
                end: 1_000
            })
        );
    }

    #[test]
    fn patch_only_writes_present_fields() {
        let patch = GoalPatch {
            status: Some(GoalStatus::Completed),
            ..GoalPatch::default()
        };
        let fields = patch.to_document_patch().resolve(0);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields.get("status"), Some(&json!("COMPLETED")));
        assert!(!patch.needs_stored_range());
    }
}
