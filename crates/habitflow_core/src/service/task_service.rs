//! Task and task-list use-case service.
//!
//! # Invariants
//! - New tasks start `OPEN`.
//! - Task listings are ordered by `dueDate` ascending whatever the filter.

use crate::model::fields;
use crate::model::task::{NewTask, Task, TaskFilter, TaskId, TaskPatch, TaskStatus};
use crate::model::task_list::{NewTaskList, TaskList, TaskListId, TaskListPatch};
use crate::service::ServiceResult;
use crate::store::codec::{decode, decode_all, encode};
use crate::store::{Collection, Direction, DocumentPatch, DocumentStore, Query};

/// Task service facade over a document store.
pub struct TaskService<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> TaskService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn create_task_list(&self, user_id: &str, list: &NewTaskList) -> ServiceResult<TaskListId> {
        list.validate()?;
        let patch = DocumentPatch::from_fields(encode(list)?)
            .set(fields::USER_ID, user_id)
            .server_timestamp(fields::CREATED_AT)
            .server_timestamp(fields::UPDATED_AT);
        Ok(self.store.add(Collection::TaskLists, &patch)?)
    }

    /// Lists the owner's task lists, newest first.
    pub fn fetch_task_lists(&self, user_id: &str) -> ServiceResult<Vec<TaskList>> {
        let query = Query::new()
            .where_eq(fields::USER_ID, user_id)
            .order_by(fields::CREATED_AT, Direction::Desc);
        Ok(decode_all(self.store.query(Collection::TaskLists, &query)?)?)
    }

    pub fn update_task_list(&self, list_id: &str, patch: &TaskListPatch) -> ServiceResult<()> {
        patch.validate()?;
        let patch = patch
            .to_document_patch()
            .server_timestamp(fields::UPDATED_AT);
        Ok(self.store.update(Collection::TaskLists, list_id, &patch)?)
    }

    /// Deletes one task list. Tasks keep their (now dangling) list id.
    pub fn delete_task_list(&self, list_id: &str) -> ServiceResult<()> {
        Ok(self.store.delete(Collection::TaskLists, list_id)?)
    }

    /// Creates an `OPEN` task owned by `user_id` and returns its id.
    pub fn create_task(&self, user_id: &str, task: &NewTask) -> ServiceResult<TaskId> {
        task.validate()?;
        let patch = DocumentPatch::from_fields(encode(task)?)
            .set(fields::USER_ID, user_id)
            .set(fields::STATUS, TaskStatus::Open.as_str())
            .server_timestamp(fields::CREATED_AT)
            .server_timestamp(fields::UPDATED_AT);
        Ok(self.store.add(Collection::Tasks, &patch)?)
    }

    pub fn get_task(&self, task_id: &str) -> ServiceResult<Option<Task>> {
        Ok(self
            .store
            .get(Collection::Tasks, task_id)?
            .map(decode::<Task>)
            .transpose()?)
    }

    /// Lists the owner's tasks by due date, narrowed by every present filter.
    pub fn fetch_tasks(&self, user_id: &str, filter: &TaskFilter) -> ServiceResult<Vec<Task>> {
        let mut query = Query::new().where_eq(fields::USER_ID, user_id);
        if let Some(list_id) = &filter.task_list_id {
            query = query.where_eq(fields::TASK_LIST_ID, list_id.as_str());
        }
        if let Some(goal_id) = &filter.goal_id {
            query = query.where_eq(fields::GOAL_ID, goal_id.as_str());
        }
        if let Some(status) = filter.status {
            query = query.where_eq(fields::STATUS, status.as_str());
        }
        let query = query.order_by(fields::DUE_DATE, Direction::Asc);
        Ok(decode_all(self.store.query(Collection::Tasks, &query)?)?)
    }

    /// Applies a partial update and restamps `updatedAt`.
    pub fn update_task(&self, task_id: &str, patch: &TaskPatch) -> ServiceResult<()> {
        patch.validate()?;
        let patch = patch
            .to_document_patch()
            .server_timestamp(fields::UPDATED_AT);
        Ok(self.store.update(Collection::Tasks, task_id, &patch)?)
    }

    pub fn delete_task(&self, task_id: &str) -> ServiceResult<()> {
        Ok(self.store.delete(Collection::Tasks, task_id)?)
    }
}
