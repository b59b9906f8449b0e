//! Core domain logic for HabitFlow.
//! This crate is the single source of truth for goals, habits, tasks and
//! the invariants that tie them together.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::goal::{Goal, GoalId, GoalPatch, GoalStatus, NewGoal};
pub use model::habit::{Frequency, Habit, HabitId, HabitPatch, NewHabit, Weekday};
pub use model::habit_log::{parse_log_date, HabitLog};
pub use model::swot::{NewSwotAnalysis, SwotAnalysis, SwotPatch};
pub use model::task::{NewTask, Task, TaskFilter, TaskPatch, TaskPriority, TaskStatus};
pub use model::task_list::{NewTaskList, TaskList, TaskListPatch};
pub use model::user::{validate_signup_input, NewUserProfile, User, UserId};
pub use model::validation::ValidationError;
pub use service::goal_service::{GoalCleanupSummary, GoalService};
pub use service::habit_log_service::HabitLogService;
pub use service::habit_service::HabitService;
pub use service::profile_service::{auth_error_message, AuthFlow, ProfileService};
pub use service::swot_service::SwotService;
pub use service::task_service::TaskService;
pub use service::{ServiceError, ServiceResult};
pub use store::{
    Collection, Document, DocumentPatch, DocumentStore, SqliteDocumentStore, StoreError,
    StoreResult, WriteBatch,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
