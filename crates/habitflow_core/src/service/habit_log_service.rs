//! Habit log use-case service.
//!
//! # Invariants
//! - `log_habit` merges into the `(habit_id, date)` record: repeated calls
//!   for one day never create a second record, and the last write wins for
//!   every field it carries.

use crate::model::fields;
use crate::model::habit_log::{format_log_date, habit_log_id, HabitLog};
use crate::service::ServiceResult;
use crate::store::codec::decode_all;
use crate::store::{Collection, Direction, DocumentPatch, DocumentStore, FilterOp, Query};
use chrono::NaiveDate;
use log::debug;

/// Habit log service facade over a document store.
pub struct HabitLogService<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> HabitLogService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Upserts the completion record for one habit and day.
    pub fn log_habit(
        &self,
        habit_id: &str,
        log_date: NaiveDate,
        is_completed: bool,
        notes: &str,
    ) -> ServiceResult<()> {
        let log_id = habit_log_id(habit_id, log_date);
        let patch = DocumentPatch::new()
            .set(fields::HABIT_ID, habit_id)
            .set(fields::LOG_DATE, format_log_date(log_date))
            .set("isCompleted", is_completed)
            .set("notes", notes)
            .server_timestamp(fields::CREATED_AT);
        self.store
            .set(Collection::HabitLogs, &log_id, &patch, true)?;
        debug!("event=habit_log module=service status=ok completed={is_completed}");
        Ok(())
    }

    /// Lists every log of one habit, oldest day first.
    pub fn fetch_habit_logs(&self, habit_id: &str) -> ServiceResult<Vec<HabitLog>> {
        let query = Query::new()
            .where_eq(fields::HABIT_ID, habit_id)
            .order_by(fields::LOG_DATE, Direction::Asc);
        Ok(decode_all(self.store.query(Collection::HabitLogs, &query)?)?)
    }

    /// Lists logs of one habit with `start <= logDate <= end`.
    pub fn fetch_habit_logs_by_range(
        &self,
        habit_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ServiceResult<Vec<HabitLog>> {
        let query = Query::new()
            .where_eq(fields::HABIT_ID, habit_id)
            .filter(fields::LOG_DATE, FilterOp::Gte, format_log_date(start))
            .filter(fields::LOG_DATE, FilterOp::Lte, format_log_date(end))
            .order_by(fields::LOG_DATE, Direction::Asc);
        Ok(decode_all(self.store.query(Collection::HabitLogs, &query)?)?)
    }

    /// Removes the record for one habit and day.
    pub fn delete_habit_log(&self, habit_id: &str, log_date: NaiveDate) -> ServiceResult<()> {
        let log_id = habit_log_id(habit_id, log_date);
        Ok(self.store.delete(Collection::HabitLogs, &log_id)?)
    }
}
