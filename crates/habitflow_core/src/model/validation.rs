//! Input validation errors and shared checks.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Input rejected before reaching the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text field is blank after trim.
    BlankField(&'static str),
    /// `end` is earlier than `start`.
    DateRangeReversed { start: i64, end: i64 },
    /// CUSTOM schedule without any weekday.
    MissingWeekdays,
    /// Weekdays given for a DAILY or WEEKLY schedule.
    UnexpectedWeekdays,
    /// Reminder time is not `HH:MM`.
    InvalidReminderTime(String),
    /// Log date is not a `YYYY-MM-DD` calendar date.
    InvalidLogDate(String),
    /// All four SWOT quadrants are blank.
    EmptyAnalysis,
    /// Unknown enum code for a field.
    InvalidValue { field: &'static str, value: String },
    InvalidEmail,
    PasswordTooShort { min: usize },
    DisplayNameTooShort { min: usize },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "{field} must not be blank"),
            Self::DateRangeReversed { start, end } => {
                write!(f, "endDate ({end}) must not be earlier than startDate ({start})")
            }
            Self::MissingWeekdays => write!(f, "CUSTOM frequency requires at least one weekday"),
            Self::UnexpectedWeekdays => {
                write!(f, "weekdays are only allowed for CUSTOM frequency")
            }
            Self::InvalidReminderTime(value) => {
                write!(f, "reminder time `{value}` is not in HH:MM format")
            }
            Self::InvalidLogDate(value) => {
                write!(f, "log date `{value}` is not a YYYY-MM-DD date")
            }
            Self::EmptyAnalysis => write!(f, "SWOT analysis needs at least one non-blank field"),
            Self::InvalidValue { field, value } => {
                write!(f, "invalid {field} value `{value}`")
            }
            Self::InvalidEmail => write!(f, "Please enter a valid email address"),
            Self::PasswordTooShort { min } => {
                write!(f, "Password must be at least {min} characters")
            }
            Self::DisplayNameTooShort { min } => {
                write!(f, "Username must be at least {min} characters")
            }
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_non_blank(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::BlankField(field))
    } else {
        Ok(())
    }
}

pub(crate) fn check_date_range(start: i64, end: i64) -> Result<(), ValidationError> {
    if end < start {
        Err(ValidationError::DateRangeReversed { start, end })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{check_date_range, require_non_blank, ValidationError};

    #[test]
    fn blank_detection_trims_whitespace() {
        assert_eq!(
            require_non_blank("name", " \t"),
            Err(ValidationError::BlankField("name"))
        );
        assert!(require_non_blank("name", " x ").is_ok());
    }

    #[test]
    fn equal_start_and_end_is_allowed() {
        assert!(check_date_range(10, 10).is_ok());
        assert!(check_date_range(10, 9).is_err());
    }
}
