//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose use-case-level functions to Dart via FRB.
//! - Translate core errors into plain response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every DB-backed call opens the configured database, so Dart should run
//!   them off the UI isolate.

use habitflow_core::db::open_db;
use habitflow_core::model::habit_log::habit_log_id;
use habitflow_core::{
    auth_error_message as auth_error_message_inner, core_version as core_version_inner,
    init_logging as init_logging_inner, init_logging_from_config, parse_log_date,
    validate_signup_input, AuthFlow, CoreConfig, Frequency, GoalService, Habit, HabitLogService,
    HabitService, NewGoal, NewHabit, NewTask, NewUserProfile, ProfileService, ServiceResult,
    SqliteDocumentStore, Task, TaskFilter, TaskPatch, TaskPriority, TaskService, TaskStatus,
    Weekday,
};
use log::{info, warn};
use std::path::PathBuf;
use std::sync::OnceLock;

const DB_FILE_NAME: &str = "habitflow.sqlite3";
const DB_PATH_ENV: &str = "HABITFLOW_DB_PATH";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Applies the host app configuration.
///
/// `config_json` follows `CoreConfig::from_json`. The database path can be
/// set once per process; repeating the same path is accepted. When `logDir`
/// is present, logging is started with the configured level.
///
/// # FFI contract
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn configure(config_json: String) -> String {
    let config = match CoreConfig::from_json(&config_json) {
        Ok(config) => config,
        Err(err) => return format!("configure failed: {err}"),
    };

    let active = DB_PATH.get_or_init(|| config.db_path.clone());
    if *active != config.db_path {
        warn!("event=ffi_configure module=ffi status=error reason=db_path_already_set");
        return format!(
            "configure failed: database path is already set to `{}`",
            active.display()
        );
    }

    if let Err(err) = init_logging_from_config(&config) {
        return format!("configure failed: {err}");
    }
    info!("event=ffi_configure module=ffi status=ok");
    String::new()
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Id of the created or touched document.
    pub id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, id: String) -> Self {
        Self {
            ok: true,
            id: Some(id),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            message: message.into(),
        }
    }
}

/// Goal row for list screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalItem {
    pub goal_id: String,
    pub name: String,
    pub description: String,
    pub start_date_ms: i64,
    pub end_date_ms: i64,
    /// `ACTIVE|COMPLETED|ARCHIVED`.
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalListResponse {
    pub items: Vec<GoalItem>,
    pub message: String,
}

/// Result of deleting a goal with its dependents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalCleanupResponse {
    pub ok: bool,
    pub habits_unlinked: u32,
    pub tasks_unlinked: u32,
    pub swot_analyses_deleted: u32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitItem {
    pub habit_id: String,
    pub goal_id: Option<String>,
    pub name: String,
    /// `DAILY|WEEKLY|CUSTOM`.
    pub frequency: String,
    /// `MON..SUN`, only for `CUSTOM`.
    pub days_of_week: Vec<String>,
    /// `HH:MM` entries.
    pub reminder_times: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitListResponse {
    pub items: Vec<HabitItem>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub task_id: String,
    pub task_list_id: Option<String>,
    pub goal_id: Option<String>,
    pub title: String,
    pub due_date_ms: i64,
    /// `OPEN|IN_PROGRESS|COMPLETED|CANCELLED`.
    pub status: String,
    /// `LOW|MEDIUM|HIGH`.
    pub priority: String,
    pub reminder_offset_minutes: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    pub items: Vec<TaskItem>,
    pub message: String,
}

/// Creates an `ACTIVE` goal.
#[flutter_rust_bridge::frb(sync)]
pub fn goal_create(
    user_id: String,
    name: String,
    description: String,
    start_date_ms: i64,
    end_date_ms: i64,
) -> ActionResponse {
    let goal = NewGoal {
        name: name.trim().to_string(),
        description,
        start_date: start_date_ms,
        end_date: end_date_ms,
    };
    match with_store(|store| GoalService::new(store).create_goal(user_id.trim(), &goal)) {
        Ok(goal_id) => ActionResponse::success("Goal created.", goal_id),
        Err(err) => ActionResponse::failure(format!("goal_create failed: {err}")),
    }
}

/// Lists the user's goals, newest first.
#[flutter_rust_bridge::frb(sync)]
pub fn goals_list(user_id: String) -> GoalListResponse {
    match with_store(|store| GoalService::new(store).fetch_goals(user_id.trim())) {
        Ok(goals) => {
            let items = goals
                .into_iter()
                .map(|goal| GoalItem {
                    goal_id: goal.id,
                    name: goal.name,
                    description: goal.description,
                    start_date_ms: goal.start_date,
                    end_date_ms: goal.end_date,
                    status: goal.status.as_str().to_string(),
                })
                .collect::<Vec<_>>();
            let message = list_message(items.len());
            GoalListResponse { items, message }
        }
        Err(err) => GoalListResponse {
            items: Vec::new(),
            message: format!("goals_list failed: {err}"),
        },
    }
}

/// Deletes a goal, unlinking its habits and tasks and deleting its SWOT
/// analyses in one atomic commit.
#[flutter_rust_bridge::frb(sync)]
pub fn goal_delete_with_cleanup(goal_id: String) -> GoalCleanupResponse {
    match with_store(|store| GoalService::new(store).delete_goal_with_cleanup(goal_id.trim())) {
        Ok(summary) => GoalCleanupResponse {
            ok: true,
            habits_unlinked: saturating_u32(summary.habits_unlinked),
            tasks_unlinked: saturating_u32(summary.tasks_unlinked),
            swot_analyses_deleted: saturating_u32(summary.swot_analyses_deleted),
            message: "Goal deleted.".to_string(),
        },
        Err(err) => GoalCleanupResponse {
            ok: false,
            habits_unlinked: 0,
            tasks_unlinked: 0,
            swot_analyses_deleted: 0,
            message: format!("goal_delete_with_cleanup failed: {err}"),
        },
    }
}

/// Creates a habit.
///
/// `frequency` and `days_of_week` use the stored upper-case codes.
#[flutter_rust_bridge::frb(sync)]
#[allow(clippy::too_many_arguments)]
pub fn habit_create(
    user_id: String,
    name: String,
    description: String,
    goal_id: Option<String>,
    start_date_ms: i64,
    end_date_ms: i64,
    frequency: String,
    days_of_week: Vec<String>,
    reminder_times: Vec<String>,
) -> ActionResponse {
    let parsed = Frequency::parse(&frequency).and_then(|frequency| {
        let days = days_of_week
            .iter()
            .map(|day| Weekday::parse(day))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((frequency, days))
    });
    let (frequency, days_of_week) = match parsed {
        Ok(parsed) => parsed,
        Err(err) => return ActionResponse::failure(format!("habit_create failed: {err}")),
    };

    let habit = NewHabit {
        name: name.trim().to_string(),
        description,
        goal_id: non_blank(goal_id),
        start_date: start_date_ms,
        end_date: end_date_ms,
        frequency,
        days_of_week,
        reminder_times,
    };
    match with_store(|store| HabitService::new(store).create_habit(user_id.trim(), habit)) {
        Ok(habit_id) => ActionResponse::success("Habit created.", habit_id),
        Err(err) => ActionResponse::failure(format!("habit_create failed: {err}")),
    }
}

/// Lists the user's habits, newest first, optionally for one goal.
#[flutter_rust_bridge::frb(sync)]
pub fn habits_list(user_id: String, goal_id: Option<String>) -> HabitListResponse {
    let goal_id = non_blank(goal_id);
    match with_store(|store| {
        HabitService::new(store).fetch_habits(user_id.trim(), goal_id.as_deref())
    }) {
        Ok(habits) => {
            let items = habits.into_iter().map(to_habit_item).collect::<Vec<_>>();
            let message = list_message(items.len());
            HabitListResponse { items, message }
        }
        Err(err) => HabitListResponse {
            items: Vec::new(),
            message: format!("habits_list failed: {err}"),
        },
    }
}

/// Records completion of a habit on a `YYYY-MM-DD` day.
///
/// Repeated calls for the same day overwrite the same record.
#[flutter_rust_bridge::frb(sync)]
pub fn habit_log(
    habit_id: String,
    log_date: String,
    is_completed: bool,
    notes: String,
) -> ActionResponse {
    let date = match parse_log_date(&log_date) {
        Ok(date) => date,
        Err(err) => return ActionResponse::failure(format!("habit_log failed: {err}")),
    };
    let habit_id = habit_id.trim();
    match with_store(|store| {
        HabitLogService::new(store).log_habit(habit_id, date, is_completed, &notes)
    }) {
        Ok(()) => ActionResponse::success("Habit logged.", habit_log_id(habit_id, date)),
        Err(err) => ActionResponse::failure(format!("habit_log failed: {err}")),
    }
}

/// Creates an `OPEN` task.
///
/// `priority` defaults to `MEDIUM` when absent.
#[flutter_rust_bridge::frb(sync)]
#[allow(clippy::too_many_arguments)]
pub fn task_create(
    user_id: String,
    title: String,
    description: String,
    due_date_ms: i64,
    task_list_id: Option<String>,
    goal_id: Option<String>,
    priority: Option<String>,
    reminder_offset_minutes: Option<u32>,
) -> ActionResponse {
    let priority = match priority.as_deref().map(TaskPriority::parse).transpose() {
        Ok(priority) => priority.unwrap_or_default(),
        Err(err) => return ActionResponse::failure(format!("task_create failed: {err}")),
    };
    let task = NewTask {
        title: title.trim().to_string(),
        description,
        task_list_id: non_blank(task_list_id),
        goal_id: non_blank(goal_id),
        due_date: due_date_ms,
        priority,
        reminder_offset_minutes,
    };
    match with_store(|store| TaskService::new(store).create_task(user_id.trim(), &task)) {
        Ok(task_id) => ActionResponse::success("Task created.", task_id),
        Err(err) => ActionResponse::failure(format!("task_create failed: {err}")),
    }
}

/// Lists the user's tasks by due date. Present filters are combined.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_list(
    user_id: String,
    task_list_id: Option<String>,
    goal_id: Option<String>,
    status: Option<String>,
) -> TaskListResponse {
    let status = match status.as_deref().map(TaskStatus::parse).transpose() {
        Ok(status) => status,
        Err(err) => {
            return TaskListResponse {
                items: Vec::new(),
                message: format!("tasks_list failed: {err}"),
            }
        }
    };
    let filter = TaskFilter {
        task_list_id: non_blank(task_list_id),
        goal_id: non_blank(goal_id),
        status,
    };
    match with_store(|store| TaskService::new(store).fetch_tasks(user_id.trim(), &filter)) {
        Ok(tasks) => {
            let items = tasks.into_iter().map(to_task_item).collect::<Vec<_>>();
            let message = list_message(items.len());
            TaskListResponse { items, message }
        }
        Err(err) => TaskListResponse {
            items: Vec::new(),
            message: format!("tasks_list failed: {err}"),
        },
    }
}

/// Moves a task to another status.
#[flutter_rust_bridge::frb(sync)]
pub fn task_set_status(task_id: String, status: String) -> ActionResponse {
    let status = match TaskStatus::parse(&status) {
        Ok(status) => status,
        Err(err) => return ActionResponse::failure(format!("task_set_status failed: {err}")),
    };
    let patch = TaskPatch {
        status: Some(status),
        ..TaskPatch::default()
    };
    let task_id = task_id.trim().to_string();
    match with_store(|store| TaskService::new(store).update_task(&task_id, &patch)) {
        Ok(()) => ActionResponse::success("Task updated.", task_id),
        Err(err) => ActionResponse::failure(format!("task_set_status failed: {err}")),
    }
}

/// Creates the profile for a freshly authenticated user when missing.
#[flutter_rust_bridge::frb(sync)]
pub fn profile_ensure(
    uid: String,
    email: Option<String>,
    display_name: String,
    photo_url: Option<String>,
) -> ActionResponse {
    let profile = NewUserProfile::new(
        uid.trim(),
        email.as_deref(),
        &display_name,
        photo_url.as_deref(),
    );
    match with_store(|store| ProfileService::new(store).create_user_profile(&profile)) {
        Ok(user) => ActionResponse::success("Profile ready.", user.uid),
        Err(err) => ActionResponse::failure(format!("profile_ensure failed: {err}")),
    }
}

/// Checks sign-up form input locally.
///
/// Returns empty string when valid, otherwise the message to show.
#[flutter_rust_bridge::frb(sync)]
pub fn signup_validate(email: String, password: String, display_name: String) -> String {
    match validate_signup_input(&email, &password, &display_name) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Maps an auth provider error code to a user-facing message.
///
/// `sign_up` selects the sign-up table; anything else is treated as sign-in.
#[flutter_rust_bridge::frb(sync)]
pub fn auth_error_message(flow: String, code: String) -> String {
    let flow = match flow.trim() {
        "sign_up" => AuthFlow::SignUp,
        _ => AuthFlow::SignIn,
    };
    auth_error_message_inner(flow, code.trim()).to_string()
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn with_store<T>(
    f: impl FnOnce(&SqliteDocumentStore<'_>) -> ServiceResult<T>,
) -> Result<T, String> {
    let db_path = resolve_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("DB open failed: {err}"))?;
    let store =
        SqliteDocumentStore::try_new(&conn).map_err(|err| format!("store init failed: {err}"))?;
    f(&store).map_err(|err| err.to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn list_message(count: usize) -> String {
    if count == 0 {
        "No results.".to_string()
    } else {
        format!("Found {count} result(s).")
    }
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

fn to_habit_item(habit: Habit) -> HabitItem {
    HabitItem {
        habit_id: habit.id,
        goal_id: habit.goal_id,
        name: habit.name,
        frequency: habit.frequency.as_str().to_string(),
        days_of_week: habit
            .days_of_week
            .into_iter()
            .map(|day| day.as_str().to_string())
            .collect(),
        reminder_times: habit.reminder_times,
    }
}

fn to_task_item(task: Task) -> TaskItem {
    TaskItem {
        task_id: task.id,
        task_list_id: task.task_list_id,
        goal_id: task.goal_id,
        title: task.title,
        due_date_ms: task.due_date,
        status: task.status.as_str().to_string(),
        priority: task.priority.as_str().to_string(),
        reminder_offset_minutes: task.reminder_offset_minutes,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        auth_error_message, configure, core_version, goal_create, goal_delete_with_cleanup,
        goals_list, habit_create, habit_log, habits_list, init_logging, profile_ensure,
        signup_validate, task_create, task_set_status, tasks_list,
    };
    use habitflow_core::db::open_db;
    use std::time::{SystemTime, UNIX_EPOCH};

    const START_MS: i64 = 1_700_000_000_000;
    const END_MS: i64 = 1_710_000_000_000;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "/tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn configure_rejects_relative_db_path() {
        let error = configure(r#"{"dbPath": "data/habitflow.sqlite3"}"#.to_string());
        assert!(error.contains("dbPath"), "{error}");
    }

    #[test]
    fn configure_accepts_the_active_db_path_again() {
        let active = super::resolve_db_path();
        let raw = format!(r#"{{"dbPath": {:?}}}"#, active.display().to_string());
        assert_eq!(configure(raw), "");
    }

    #[test]
    fn goal_cleanup_unlinks_habits_and_tasks() {
        let owner = unique_token("owner-cleanup");
        let goal = goal_create(
            owner.clone(),
            "Run 5k".to_string(),
            String::new(),
            START_MS,
            END_MS,
        );
        assert!(goal.ok, "{}", goal.message);
        let goal_id = goal.id.expect("goal create should return id");

        let habit = habit_create(
            owner.clone(),
            "Jog".to_string(),
            String::new(),
            Some(goal_id.clone()),
            START_MS,
            END_MS,
            "CUSTOM".to_string(),
            vec!["WED".to_string(), "MON".to_string()],
            vec!["06:45".to_string()],
        );
        assert!(habit.ok, "{}", habit.message);
        let task = task_create(
            owner.clone(),
            "Buy shoes".to_string(),
            String::new(),
            START_MS,
            None,
            Some(goal_id.clone()),
            None,
            Some(0),
        );
        assert!(task.ok, "{}", task.message);

        let cleanup = goal_delete_with_cleanup(goal_id.clone());
        assert!(cleanup.ok, "{}", cleanup.message);
        assert_eq!(cleanup.habits_unlinked, 1);
        assert_eq!(cleanup.tasks_unlinked, 1);
        assert_eq!(cleanup.swot_analyses_deleted, 0);

        assert!(goals_list(owner.clone()).items.is_empty());
        let habits = habits_list(owner.clone(), None);
        assert_eq!(habits.items.len(), 1);
        assert_eq!(habits.items[0].goal_id, None);
        assert_eq!(habits.items[0].days_of_week, vec!["MON", "WED"]);
        let tasks = tasks_list(owner, None, None, None);
        assert_eq!(tasks.items.len(), 1);
        assert_eq!(tasks.items[0].goal_id, None);
        assert_eq!(tasks.items[0].priority, "MEDIUM");
        assert_eq!(tasks.items[0].reminder_offset_minutes, Some(0));
    }

    #[test]
    fn habit_create_rejects_unknown_frequency() {
        let response = habit_create(
            unique_token("owner-freq"),
            "Read".to_string(),
            String::new(),
            None,
            START_MS,
            END_MS,
            "HOURLY".to_string(),
            Vec::new(),
            Vec::new(),
        );
        assert!(!response.ok);
        assert!(response.message.contains("HOURLY"), "{}", response.message);
    }

    #[test]
    fn habit_log_upserts_one_record_per_day() {
        let habit_id = unique_token("habit");
        let day = "2024-03-01".to_string();
        let first = habit_log(habit_id.clone(), day.clone(), false, String::new());
        assert!(first.ok, "{}", first.message);
        let second = habit_log(habit_id.clone(), day, true, "ok".to_string());
        assert!(second.ok, "{}", second.message);
        assert_eq!(first.id, second.id);
        assert_eq!(second.id, Some(format!("{habit_id}_2024-03-01")));

        let conn = open_db(super::resolve_db_path()).expect("open db");
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM documents
                 WHERE collection = 'habitLogs'
                   AND json_extract(body, '$.habitId') = ?1",
                [habit_id.as_str()],
                |row| row.get(0),
            )
            .expect("count habit logs");
        assert_eq!(count, 1);

        let invalid = habit_log(habit_id, "2024-02-30".to_string(), true, String::new());
        assert!(!invalid.ok);
    }

    #[test]
    fn task_status_filter_follows_updates() {
        let owner = unique_token("owner-status");
        let created = task_create(
            owner.clone(),
            "File taxes".to_string(),
            String::new(),
            START_MS,
            None,
            None,
            Some("HIGH".to_string()),
            None,
        );
        let task_id = created.id.expect("task create should return id");

        let updated = task_set_status(task_id.clone(), "COMPLETED".to_string());
        assert!(updated.ok, "{}", updated.message);
        let done = tasks_list(owner.clone(), None, None, Some("COMPLETED".to_string()));
        assert_eq!(done.items.len(), 1);
        assert_eq!(done.items[0].task_id, task_id);
        assert!(tasks_list(owner, None, None, Some("OPEN".to_string()))
            .items
            .is_empty());

        let missing = task_set_status(unique_token("ghost"), "OPEN".to_string());
        assert!(!missing.ok);
    }

    #[test]
    fn profile_ensure_is_idempotent() {
        let uid = unique_token("uid");
        let first = profile_ensure(
            uid.clone(),
            Some("a@example.com".to_string()),
            "Ana".to_string(),
            None,
        );
        let second = profile_ensure(uid.clone(), None, "Other".to_string(), None);
        assert!(first.ok, "{}", first.message);
        assert!(second.ok, "{}", second.message);
        assert_eq!(second.id, Some(uid));
    }

    #[test]
    fn signup_and_auth_messages() {
        let password = "secret1".to_string();
        let name = "Ana".to_string();
        assert_eq!(
            signup_validate("a@example.com".to_string(), password.clone(), name.clone()),
            ""
        );
        assert_eq!(
            signup_validate("not-an-email".to_string(), password, name),
            "Please enter a valid email address"
        );
        assert_eq!(
            auth_error_message("sign_up".to_string(), "auth/email-already-in-use".to_string()),
            "This email is already registered. Please sign in instead."
        );
        assert_eq!(
            auth_error_message("sign_in".to_string(), "auth/unknown".to_string()),
            "Unable to sign in. Please try again."
        );
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
