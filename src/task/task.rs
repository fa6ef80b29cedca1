//! Core Task type, its priority levels, and the errors raised by task operations.
//!
//! # Invariants
//! - `id` is assigned by the store on the first save and never changes
//! - `completed == true` implies `priority == Priority::Low` whenever completion
//!   was set through [`super::TaskManager::update_task`]

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Wire and storage format of a due date.
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Unique identifier for a stored task.
///
/// # Properties
/// - Assigned by the store, strictly increasing
/// - Never reused, even after the task is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(i64);

impl TaskId {
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Get the inner integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Priority of a task.
///
/// Variants are declared in sort order: `High < Medium < Low`, so an ascending
/// sort puts the most urgent tasks first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        }
    }

    /// Parse a priority name, ignoring case.
    pub fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("HIGH") {
            Some(Priority::High)
        } else if value.eq_ignore_ascii_case("MEDIUM") {
            Some(Priority::Medium)
        } else if value.eq_ignore_ascii_case("LOW") {
            Some(Priority::Low)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub due_date: NaiveDate,
    pub completed: bool,
}

/// Mutable, store-facing form of a task.
///
/// A draft without an `id` is inserted by [`crate::task_store::TaskStore::save`]
/// and receives a fresh id; a draft with an `id` overwrites that task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub id: Option<TaskId>,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub due_date: NaiveDate,
    pub completed: bool,
}

impl TaskDraft {
    /// Attach an id, producing the stored form.
    pub fn into_task(self, id: TaskId) -> Task {
        Task {
            id,
            title: self.title,
            description: self.description,
            priority: self.priority,
            due_date: self.due_date,
            completed: self.completed,
        }
    }
}

impl From<Task> for TaskDraft {
    fn from(task: Task) -> Self {
        Self {
            id: Some(task.id),
            title: task.title,
            description: task.description,
            priority: task.priority,
            due_date: task.due_date,
            completed: task.completed,
        }
    }
}

/// Input for creating a task.
///
/// `due_date` is kept as text so a malformed date is reported as
/// [`TaskError::InvalidDate`] rather than a deserialization failure.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub due_date: String,
    pub is_critical: bool,
}

/// Partial update of a task. Only `Some` fields are applied.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
}

/// Parse a `yyyy-MM-dd` due date.
pub fn parse_due_date(value: &str) -> Result<NaiveDate, TaskError> {
    NaiveDate::parse_from_str(value.trim(), DUE_DATE_FORMAT).map_err(|_| {
        TaskError::InvalidDate(format!(
            "Invalid date format: {}. Please use yyyy-MM-dd.",
            value
        ))
    })
}

/// Errors that can occur during task operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("{0}")]
    InvalidDate(String),

    #[error("A task with the same title and due date already exists: title: {title} date: {due_date}")]
    DuplicateTask { title: String, due_date: NaiveDate },

    #[error("Unsupported sort option: {0}. Supported sort options are 'priority' or 'date'.")]
    UnsupportedSort(String),

    #[error("Unsupported filter: {0}. Supported filters are 'completed' or 'priority'.")]
    UnsupportedFilter(String),

    #[error("Invalid value for {filter} filter: {value}. {hint}")]
    InvalidFilterValue {
        filter: String,
        value: String,
        hint: &'static str,
    },

    #[error("Task not found with id: {0}")]
    TaskNotFound(TaskId),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("Task store error: {0}")]
    Store(String),
}
