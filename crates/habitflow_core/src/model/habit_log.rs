//! Per-day habit completion record.
//!
//! # Invariants
//! - Identity is `(habit_id, log_date)`; the document id is
//!   `"{habit_id}_{YYYY-MM-DD}"`, so one record exists per habit per day.

use crate::model::habit::HabitId;
use crate::model::validation::ValidationError;
use crate::store::DocumentId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const LOG_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitLog {
    pub id: DocumentId,
    pub habit_id: HabitId,
    pub log_date: NaiveDate,
    pub is_completed: bool,
    #[serde(default)]
    pub notes: String,
    /// Stamped by every log write.
    pub created_at: i64,
}

/// Composite document id for one habit/day pair.
pub fn habit_log_id(habit_id: &str, log_date: NaiveDate) -> DocumentId {
    format!("{habit_id}_{}", log_date.format(LOG_DATE_FORMAT))
}

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_log_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), LOG_DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidLogDate(value.to_string()))
}

pub fn format_log_date(date: NaiveDate) -> String {
    date.format(LOG_DATE_FORMAT).to_string()
}
