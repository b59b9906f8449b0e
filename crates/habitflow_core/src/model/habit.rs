//! Habit entity and schedule rules.
//!
//! # Invariants
//! - `CUSTOM` frequency carries at least one weekday; other frequencies none.
//! - Weekdays are stored sorted Monday-first without duplicates.
//! - Reminder times are `HH:MM` (24h).

use crate::model::fields;
use crate::model::goal::GoalId;
use crate::model::user::UserId;
use crate::model::validation::{check_date_range, require_non_blank, ValidationError};
use crate::store::{DocumentId, DocumentPatch};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type HabitId = DocumentId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    Daily,
    Weekly,
    Custom,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Custom => "CUSTOM",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value.trim().to_ascii_uppercase().as_str() {
            "DAILY" => Ok(Self::Daily),
            "WEEKLY" => Ok(Self::Weekly),
            "CUSTOM" => Ok(Self::Custom),
            _ => Err(ValidationError::InvalidValue {
                field: "frequency",
                value: value.to_string(),
            }),
        }
    }
}

/// Weekday code used by `CUSTOM` schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mon => "MON",
            Self::Tue => "TUE",
            Self::Wed => "WED",
            Self::Thu => "THU",
            Self::Fri => "FRI",
            Self::Sat => "SAT",
            Self::Sun => "SUN",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value.trim().to_ascii_uppercase().as_str() {
            "MON" => Ok(Self::Mon),
            "TUE" => Ok(Self::Tue),
            "WED" => Ok(Self::Wed),
            "THU" => Ok(Self::Thu),
            "FRI" => Ok(Self::Fri),
            "SAT" => Ok(Self::Sat),
            "SUN" => Ok(Self::Sun),
            _ => Err(ValidationError::InvalidValue {
                field: "daysOfWeek",
                value: value.to_string(),
            }),
        }
    }
}

/// A recurring behaviour the user wants to track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: HabitId,
    pub user_id: UserId,
    /// Cleared when the referenced goal is deleted.
    pub goal_id: Option<GoalId>,
    pub name: String,
    pub description: String,
    pub start_date: i64,
    pub end_date: i64,
    pub frequency: Frequency,
    #[serde(default)]
    pub days_of_week: Vec<Weekday>,
    #[serde(default)]
    pub reminder_times: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Input for creating a habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHabit {
    pub name: String,
    pub description: String,
    pub goal_id: Option<GoalId>,
    pub start_date: i64,
    pub end_date: i64,
    pub frequency: Frequency,
    pub days_of_week: Vec<Weekday>,
    pub reminder_times: Vec<String>,
}

impl NewHabit {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("name", &self.name)?;
        check_date_range(self.start_date, self.end_date)?;
        validate_schedule(self.frequency, &self.days_of_week)?;
        validate_reminder_times(&self.reminder_times)
    }

    /// Returns the habit with weekdays sorted and deduplicated and reminder
    /// times trimmed.
    pub fn normalized(mut self) -> Self {
        self.days_of_week = normalize_weekdays(self.days_of_week);
        self.reminder_times = normalize_reminder_times(&self.reminder_times);
        self
    }
}

/// Partial habit update; `None` leaves a field untouched.
///
/// `goal_id: Some(None)` unlinks the habit from its goal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HabitPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub goal_id: Option<Option<GoalId>>,
    pub start_date: Option<i64>,
    pub end_date: Option<i64>,
    pub frequency: Option<Frequency>,
    pub days_of_week: Option<Vec<Weekday>>,
    pub reminder_times: Option<Vec<String>>,
}

impl HabitPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            require_non_blank("name", name)?;
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            check_date_range(start, end)?;
        }
        if let (Some(frequency), Some(days)) = (self.frequency, &self.days_of_week) {
            validate_schedule(frequency, days)?;
        }
        if let Some(times) = &self.reminder_times {
            validate_reminder_times(times)?;
        }
        Ok(())
    }

    /// True when the patch changes only part of a cross-field rule, so the
    /// stored habit is needed to validate it.
    pub fn needs_stored_habit(&self) -> bool {
        self.start_date.is_some() != self.end_date.is_some()
            || self.frequency.is_some() != self.days_of_week.is_some()
    }

    /// Applies this patch to a stored habit and validates the result.
    pub fn validate_against(&self, stored: &Habit) -> Result<(), ValidationError> {
        let start = self.start_date.unwrap_or(stored.start_date);
        let end = self.end_date.unwrap_or(stored.end_date);
        check_date_range(start, end)?;
        let frequency = self.frequency.unwrap_or(stored.frequency);
        let days = self.days_of_week.as_ref().unwrap_or(&stored.days_of_week);
        validate_schedule(frequency, days)
    }

    pub fn to_document_patch(&self) -> DocumentPatch {
        let mut patch = DocumentPatch::new();
        if let Some(name) = &self.name {
            patch.insert("name", name.as_str());
        }
        if let Some(description) = &self.description {
            patch.insert("description", description.as_str());
        }
        if let Some(goal_id) = &self.goal_id {
            patch.insert(fields::GOAL_ID, goal_id.clone().map_or(Value::Null, Value::from));
        }
        if let Some(start_date) = self.start_date {
            patch.insert("startDate", start_date);
        }
        if let Some(end_date) = self.end_date {
            patch.insert("endDate", end_date);
        }
        if let Some(frequency) = self.frequency {
            patch.insert("frequency", frequency.as_str());
        }
        if let Some(days) = &self.days_of_week {
            let codes = normalize_weekdays(days.clone())
                .into_iter()
                .map(|day| Value::from(day.as_str()))
                .collect::<Vec<_>>();
            patch.insert("daysOfWeek", codes);
        }
        if let Some(times) = &self.reminder_times {
            patch.insert("reminderTimes", normalize_reminder_times(times));
        }
        patch
    }
}

/// Checks the frequency/weekday pairing.
pub fn validate_schedule(frequency: Frequency, days: &[Weekday]) -> Result<(), ValidationError> {
    match (frequency, days.is_empty()) {
        (Frequency::Custom, true) => Err(ValidationError::MissingWeekdays),
        (Frequency::Daily | Frequency::Weekly, false) => Err(ValidationError::UnexpectedWeekdays),
        _ => Ok(()),
    }
}

/// Checks every reminder time is `HH:MM`.
pub fn validate_reminder_times(times: &[String]) -> Result<(), ValidationError> {
    for time in times {
        let trimmed = time.trim();
        if trimmed.len() != 5 || NaiveTime::parse_from_str(trimmed, "%H:%M").is_err() {
            return Err(ValidationError::InvalidReminderTime(time.clone()));
        }
    }
    Ok(())
}

pub fn normalize_reminder_times(times: &[String]) -> Vec<String> {
    times.iter().map(|time| time.trim().to_string()).collect()
}

pub fn normalize_weekdays(mut days: Vec<Weekday>) -> Vec<Weekday> {
    days.sort();
    days.dedup();
    days
}

#[cfg(test)]
mod tests {
    use super::{
        normalize_weekdays, validate_reminder_times, validate_schedule, Frequency, HabitPatch,
        Weekday,
    };
    use crate::model::validation::ValidationError;
    use serde_json::{json, Value};

    #[test]
    fn custom_schedule_requires_weekdays() {
        assert_eq!(
            validate_schedule(Frequency::Custom, &[]),
            Err(ValidationError::MissingWeekdays)
        );
        assert!(validate_schedule(Frequency::Custom, &[Weekday::Mon]).is_ok());
        assert_eq!(
            validate_schedule(Frequency::Daily, &[Weekday::Mon]),
            Err(ValidationError::UnexpectedWeekdays)
        );
    }

    #[test]
    fn reminder_times_must_be_hh_mm() {
        assert!(validate_reminder_times(&["07:30".to_string(), "23:59".to_string()]).is_ok());
        assert!(validate_reminder_times(&["7:30".to_string()]).is_err());
        assert!(validate_reminder_times(&["24:00".to_string()]).is_err());
    }

    #[test]
    fn weekdays_are_sorted_and_deduplicated() {
        let days = normalize_weekdays(vec![Weekday::Fri, Weekday::Mon, Weekday::Fri]);
        assert_eq!(days, vec![Weekday::Mon, Weekday::Fri]);
        assert_eq!(serde_json::to_value(Weekday::Wed).unwrap(), json!("WED"));
    }

    #[test]
    fn unlink_patch_writes_explicit_null() {
        let patch = HabitPatch {
            goal_id: Some(None),
            ..HabitPatch::default()
        };
        let fields = patch.to_document_patch().resolve(0);
        assert_eq!(fields.get("goalId"), Some(&Value::Null));
    }
}
