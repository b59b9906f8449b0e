//! Typed domain model for goals, habits, tasks and their satellites.
//!
//! # Responsibility
//! - Define the entities stored in each collection and their write shapes.
//! - Validate user input before any store call.
//!
//! # Invariants
//! - Habit, Task and SWOT analysis reference at most one goal, by id only.
//! - Timestamps and calendar instants are Unix epoch milliseconds.
//! - Field names on the wire are camelCase; enum values are upper-case.

pub mod goal;
pub mod habit;
pub mod habit_log;
pub mod swot;
pub mod task;
pub mod task_list;
pub mod user;
pub mod validation;

/// Document field names shared across collections.
pub mod fields {
    pub const USER_ID: &str = "userId";
    pub const GOAL_ID: &str = "goalId";
    pub const HABIT_ID: &str = "habitId";
    pub const TASK_LIST_ID: &str = "taskListId";
    pub const STATUS: &str = "status";
    pub const DUE_DATE: &str = "dueDate";
    pub const LOG_DATE: &str = "logDate";
    pub const CREATED_AT: &str = "createdAt";
    pub const UPDATED_AT: &str = "updatedAt";
}
