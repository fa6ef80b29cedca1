//! # Task Prioritizer
//!
//! HTTP service for a flat task list with derived priorities.
//!
//! ## Architecture
//!
//! ```text
//!   HTTP (axum)  ──►  TaskManager  ──►  TaskStore
//!   api::tasks        task rules        memory | file | sqlite
//! ```
//!
//! ## Modules
//! - `api`: HTTP routes and wire types
//! - `task`: Task model, priority policy and the `TaskManager`
//! - `task_store`: Storage trait and backends
//! - `seed`: Demo data for empty stores

pub mod api;
pub mod config;
pub mod seed;
pub mod task;
pub mod task_store;
pub mod util;

pub use config::Config;
pub use task::{Task, TaskError, TaskManager};
pub use task_store::{TaskStore, TaskStoreType};
