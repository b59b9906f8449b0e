//! SWOT analysis entity.
//!
//! An analysis is existentially tied to its goal: goal cleanup deletes it
//! instead of unlinking it.

use crate::model::fields;
use crate::model::goal::GoalId;
use crate::model::user::UserId;
use crate::model::validation::ValidationError;
use crate::store::{DocumentId, DocumentPatch};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type SwotId = DocumentId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwotAnalysis {
    pub id: SwotId,
    pub user_id: UserId,
    pub goal_id: Option<GoalId>,
    pub strengths: String,
    pub weaknesses: String,
    pub opportunities: String,
    pub threats: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSwotAnalysis {
    pub goal_id: Option<GoalId>,
    pub strengths: String,
    pub weaknesses: String,
    pub opportunities: String,
    pub threats: String,
}

impl NewSwotAnalysis {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_some_content([
            &self.strengths,
            &self.weaknesses,
            &self.opportunities,
            &self.threats,
        ])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwotPatch {
    pub goal_id: Option<Option<GoalId>>,
    pub strengths: Option<String>,
    pub weaknesses: Option<String>,
    pub opportunities: Option<String>,
    pub threats: Option<String>,
}

impl SwotPatch {
    /// True when any quadrant is rewritten.
    pub fn touches_quadrants(&self) -> bool {
        self.strengths.is_some()
            || self.weaknesses.is_some()
            || self.opportunities.is_some()
            || self.threats.is_some()
    }

    /// Applies this patch to a stored analysis and checks it still says
    /// something.
    pub fn validate_against(&self, stored: &SwotAnalysis) -> Result<(), ValidationError> {
        require_some_content([
            self.strengths.as_ref().unwrap_or(&stored.strengths),
            self.weaknesses.as_ref().unwrap_or(&stored.weaknesses),
            self.opportunities.as_ref().unwrap_or(&stored.opportunities),
            self.threats.as_ref().unwrap_or(&stored.threats),
        ])
    }

    pub fn to_document_patch(&self) -> DocumentPatch {
        let mut patch = DocumentPatch::new();
        if let Some(goal_id) = &self.goal_id {
            patch.insert(fields::GOAL_ID, goal_id.clone().map_or(Value::Null, Value::String));
        }
        let quadrants = [
            ("strengths", &self.strengths),
            ("weaknesses", &self.weaknesses),
            ("opportunities", &self.opportunities),
            ("threats", &self.threats),
        ];
        for (field, value) in quadrants {
            if let Some(text) = value {
                patch.insert(field, text.as_str());
            }
        }
        patch
    }
}

fn require_some_content(quadrants: [&String; 4]) -> Result<(), ValidationError> {
    if quadrants.iter().all(|text| text.trim().is_empty()) {
        return Err(ValidationError::EmptyAnalysis);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{NewSwotAnalysis, SwotAnalysis, SwotPatch};
    use crate::model::validation::ValidationError;

    #[test]
    fn analysis_needs_one_non_blank_quadrant() {
        let empty = NewSwotAnalysis {
            strengths: "  ".to_string(),
            ..NewSwotAnalysis::default()
        };
        assert_eq!(empty.validate(), Err(ValidationError::EmptyAnalysis));

        let filled = NewSwotAnalysis {
            threats: "Competing priorities".to_string(),
            ..NewSwotAnalysis::default()
        };
        assert!(filled.validate().is_ok());
    }

    #[test]
    fn patch_may_not_blank_the_last_filled_quadrant() {
        let stored = SwotAnalysis {
            id: "s1".to_string(),
            user_id: "u1".to_string(),
            goal_id: None,
            strengths: "Early riser".to_string(),
            weaknesses: String::new(),
            opportunities: String::new(),
            threats: String::new(),
            created_at: 0,
            updated_at: 0,
        };

        let blanking = SwotPatch {
            strengths: Some(" ".to_string()),
            ..SwotPatch::default()
        };
        assert!(blanking.touches_quadrants());
        assert_eq!(
            blanking.validate_against(&stored),
            Err(ValidationError::EmptyAnalysis)
        );

        let moving = SwotPatch {
            strengths: Some(String::new()),
            threats: Some("Travel weeks".to_string()),
            ..SwotPatch::default()
        };
        assert!(moving.validate_against(&stored).is_ok());

        let relink = SwotPatch {
            goal_id: Some(None),
            ..SwotPatch::default()
        };
        assert!(!relink.touches_quadrants());
    }
}
