//! Habit use-case service.

use crate::model::fields;
use crate::model::habit::{Habit, HabitId, HabitPatch, NewHabit};
use crate::service::{ServiceError, ServiceResult};
use crate::store::codec::{decode, decode_all, encode};
use crate::store::{Collection, Direction, DocumentPatch, DocumentStore, Query};

/// Habit service facade over a document store.
pub struct HabitService<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> HabitService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates a habit owned by `user_id` and returns its id.
    pub fn create_habit(&self, user_id: &str, habit: NewHabit) -> ServiceResult<HabitId> {
        habit.validate()?;
        let habit = habit.normalized();
        let patch = DocumentPatch::from_fields(encode(&habit)?)
            .set(fields::USER_ID, user_id)
            .server_timestamp(fields::CREATED_AT)
            .server_timestamp(fields::UPDATED_AT);
        Ok(self.store.add(Collection::Habits, &patch)?)
    }

    pub fn get_habit(&self, habit_id: &str) -> ServiceResult<Option<Habit>> {
        Ok(self
            .store
            .get(Collection::Habits, habit_id)?
            .map(decode::<Habit>)
            .transpose()?)
    }

    /// Lists the owner's habits, newest first, optionally for one goal.
    pub fn fetch_habits(&self, user_id: &str, goal_id: Option<&str>) -> ServiceResult<Vec<Habit>> {
        let mut query = Query::new().where_eq(fields::USER_ID, user_id);
        if let Some(goal_id) = goal_id {
            query = query.where_eq(fields::GOAL_ID, goal_id);
        }
        let query = query.order_by(fields::CREATED_AT, Direction::Desc);
        Ok(decode_all(self.store.query(Collection::Habits, &query)?)?)
    }

    /// Applies a partial update and restamps `updatedAt`.
    pub fn update_habit(&self, habit_id: &str, patch: &HabitPatch) -> ServiceResult<()> {
        patch.validate()?;
        if patch.needs_stored_habit() {
            let stored = self
                .get_habit(habit_id)?
                .ok_or_else(|| ServiceError::NotFound {
                    collection: Collection::Habits,
                    id: habit_id.to_string(),
                })?;
            patch.validate_against(&stored)?;
        }
        let patch = patch
            .to_document_patch()
            .server_timestamp(fields::UPDATED_AT);
        Ok(self.store.update(Collection::Habits, habit_id, &patch)?)
    }

    /// Deletes one habit. Its logs are kept.
    pub fn delete_habit(&self, habit_id: &str) -> ServiceResult<()> {
        Ok(self.store.delete(Collection::Habits, habit_id)?)
    }
}
