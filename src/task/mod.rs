//! Task module - the task model, priority policy, and the manager that
//! enforces task rules on top of a [`crate::task_store::TaskStore`].
//!
//! The manager is the only place where validation happens:
//! - Stores persist whatever they are given
//! - The HTTP layer only translates wire types and error kinds

mod manager;
mod priority;
pub mod task;

pub use manager::{Today, TaskManager};
pub use priority::{derive_priority, PriorityRule, FALLBACK_PRIORITY, PRIORITY_RULES};
pub use task::{
    parse_due_date, NewTask, Priority, Task, TaskDraft, TaskError, TaskId, TaskPatch,
    DUE_DATE_FORMAT,
};
