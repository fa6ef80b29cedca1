//! Task storage module with pluggable backends.
//!
//! Supports:
//! - `memory`: In-memory storage (non-persistent, for testing)
//! - `file`: JSON file-based storage
//! - `sqlite`: SQLite database (default)
//!
//! Stores do no validation of their own; the rules live in
//! [`crate::task::TaskManager`].

mod file;
mod memory;
mod sqlite;

pub use file::FileTaskStore;
pub use memory::InMemoryTaskStore;
pub use sqlite::SqliteTaskStore;

use crate::task::{Priority, Task, TaskDraft, TaskId};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::PathBuf;

/// Task store trait - implemented by all storage backends.
///
/// Every listing returns tasks in ascending id order.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Whether this store persists data across restarts.
    fn is_persistent(&self) -> bool;

    /// Insert a draft without an id (assigning a fresh one), or overwrite the
    /// task with the draft's id.
    async fn save(&self, draft: TaskDraft) -> Result<Task, String>;

    /// Get a single task by ID.
    async fn find_by_id(&self, id: TaskId) -> Result<Option<Task>, String>;

    /// Get the task with exactly this title and due date, if any.
    async fn find_by_title_and_due_date(
        &self,
        title: &str,
        due_date: NaiveDate,
    ) -> Result<Option<Task>, String>;

    /// List tasks whose completion flag matches.
    async fn find_by_completed(&self, completed: bool) -> Result<Vec<Task>, String>;

    /// List tasks with the given priority.
    async fn find_by_priority(&self, priority: Priority) -> Result<Vec<Task>, String>;

    /// List all tasks.
    async fn find_all(&self) -> Result<Vec<Task>, String>;

    /// Delete a task. Deleting a missing id is not an error.
    async fn delete_by_id(&self, id: TaskId) -> Result<(), String>;

    /// Whether a task with this id is stored.
    async fn exists_by_id(&self, id: TaskId) -> Result<bool, String> {
        Ok(self.find_by_id(id).await?.is_some())
    }

    /// Number of stored tasks.
    async fn count(&self) -> Result<usize, String>;
}

/// Task store type selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskStoreType {
    Memory,
    File,
    #[default]
    Sqlite,
}

impl TaskStoreType {
    /// Parse from environment variable value.
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "memory" => Self::Memory,
            "file" | "json" => Self::File,
            "sqlite" | "db" => Self::Sqlite,
            _ => Self::default(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::File => "file",
            Self::Sqlite => "sqlite",
        }
    }
}

/// Create a task store based on type and configuration.
pub async fn create_task_store(
    store_type: TaskStoreType,
    base_dir: PathBuf,
) -> Result<Box<dyn TaskStore>, String> {
    match store_type {
        TaskStoreType::Memory => Ok(Box::new(InMemoryTaskStore::new())),
        TaskStoreType::File => {
            let store = FileTaskStore::new(base_dir).await?;
            Ok(Box::new(store))
        }
        TaskStoreType::Sqlite => {
            let store = SqliteTaskStore::new(base_dir).await?;
            Ok(Box::new(store))
        }
    }
}

/// Shared ordering for snapshot-backed stores.
pub(crate) fn sorted_by_id<'a>(tasks: impl Iterator<Item = &'a Task>) -> Vec<Task> {
    let mut out: Vec<Task> = tasks.cloned().collect();
    out.sort_by_key(|t| t.id);
    out
}
