//! Goal use-case service.
//!
//! # Responsibility
//! - Create, list, update and delete goals.
//! - Delete a goal together with its dependents in one atomic batch.
//!
//! # Invariants
//! - New goals start `ACTIVE`.
//! - After a successful cleanup no habit or task references the goal and no
//!   SWOT analysis for it exists. A failed commit applies nothing.

use crate::model::fields;
use crate::model::goal::{Goal, GoalId, GoalPatch, GoalStatus, NewGoal};
use crate::model::validation::check_date_range;
use crate::service::{ServiceError, ServiceResult};
use crate::store::codec::{decode, decode_all, encode};
use crate::store::{Collection, Direction, DocumentPatch, DocumentStore, Query};
use log::{error, info};
use serde_json::Value;
use std::time::Instant;

/// What a goal cleanup changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GoalCleanupSummary {
    pub habits_unlinked: usize,
    pub tasks_unlinked: usize,
    pub swot_analyses_deleted: usize,
}

/// Goal service facade over a document store.
pub struct GoalService<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> GoalService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates an `ACTIVE` goal owned by `user_id` and returns its id.
    pub fn create_goal(&self, user_id: &str, goal: &NewGoal) -> ServiceResult<GoalId> {
        goal.validate()?;
        let patch = DocumentPatch::from_fields(encode(goal)?)
            .set(fields::USER_ID, user_id)
            .set(fields::STATUS, GoalStatus::Active.as_str())
            .server_timestamp(fields::CREATED_AT)
            .server_timestamp(fields::UPDATED_AT);
        Ok(self.store.add(Collection::Goals, &patch)?)
    }

    /// Gets one goal by id.
    pub fn get_goal(&self, goal_id: &str) -> ServiceResult<Option<Goal>> {
        self.store
            .get(Collection::Goals, goal_id)?
            .map(decode::<Goal>)
            .transpose()
            .map_err(Into::into)
    }

    /// Lists the owner's goals, newest first.
    pub fn fetch_goals(&self, user_id: &str) -> ServiceResult<Vec<Goal>> {
        let query = Query::new()
            .where_eq(fields::USER_ID, user_id)
            .order_by(fields::CREATED_AT, Direction::Desc);
        Ok(decode_all(self.store.query(Collection::Goals, &query)?)?)
    }

    /// Applies a partial update and restamps `updatedAt`.
    ///
    /// When only one end of the date range changes, the stored goal is read
    /// to check the resulting range.
    pub fn update_goal(&self, goal_id: &str, patch: &GoalPatch) -> ServiceResult<()> {
        patch.validate()?;
        if patch.needs_stored_range() {
            let stored = self.require_goal(goal_id)?;
            check_date_range(
                patch.start_date.unwrap_or(stored.start_date),
                patch.end_date.unwrap_or(stored.end_date),
            )?;
        }
        let patch = patch
            .to_document_patch()
            .server_timestamp(fields::UPDATED_AT);
        Ok(self.store.update(Collection::Goals, goal_id, &patch)?)
    }

    /// Deletes only the goal document, leaving dependents untouched.
    pub fn delete_goal(&self, goal_id: &str) -> ServiceResult<()> {
        Ok(self.store.delete(Collection::Goals, goal_id)?)
    }

    /// Deletes a goal and restores referential integrity in one batch.
    ///
    /// Linked habits and tasks get `goalId = null` and a fresh `updatedAt`;
    /// linked SWOT analyses are deleted; then the goal itself is deleted.
    /// The goal's existence is not checked: an absent goal still commits.
    ///
    /// # Errors
    /// - Query failures and commit failures are returned unchanged; when the
    ///   commit fails no write of the batch is applied.
    pub fn delete_goal_with_cleanup(&self, goal_id: &str) -> ServiceResult<GoalCleanupSummary> {
        let started_at = Instant::now();
        let linked = Query::new().where_eq(fields::GOAL_ID, goal_id);
        let unlink = DocumentPatch::new()
            .set(fields::GOAL_ID, Value::Null)
            .server_timestamp(fields::UPDATED_AT);

        let mut batch = self.store.batch();
        let mut summary = GoalCleanupSummary::default();

        for habit in self.store.query(Collection::Habits, &linked)? {
            batch.update(Collection::Habits, habit.id, unlink.clone());
            summary.habits_unlinked += 1;
        }
        for task in self.store.query(Collection::Tasks, &linked)? {
            batch.update(Collection::Tasks, task.id, unlink.clone());
            summary.tasks_unlinked += 1;
        }
        for analysis in self.store.query(Collection::SwotAnalyses, &linked)? {
            batch.delete(Collection::SwotAnalyses, analysis.id);
            summary.swot_analyses_deleted += 1;
        }
        batch.delete(Collection::Goals, goal_id);

        if let Err(err) = self.store.commit(batch) {
            error!(
                "event=goal_delete_cleanup module=service status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }

        info!(
            "event=goal_delete_cleanup module=service status=ok habits_unlinked={} tasks_unlinked={} swot_deleted={} duration_ms={}",
            summary.habits_unlinked,
            summary.tasks_unlinked,
            summary.swot_analyses_deleted,
            started_at.elapsed().as_millis()
        );
        Ok(summary)
    }

    fn require_goal(&self, goal_id: &str) -> ServiceResult<Goal> {
        self.get_goal(goal_id)?.ok_or_else(|| ServiceError::NotFound {
            collection: Collection::Goals,
            id: goal_id.to_string(),
        })
    }
}
