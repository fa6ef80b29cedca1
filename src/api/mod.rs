//! HTTP API for the task service.
//!
//! ## Endpoints
//!
//! - `GET /api/health` - Health check
//! - `POST /tasks/create` - Create a task
//! - `GET /tasks/sort` - List tasks sorted by priority or date
//! - `GET /tasks/filter` - List tasks by completion or priority
//! - `PATCH /tasks/update/:id` - Partially update a task
//! - `DELETE /tasks/delete/:id` - Delete a task
//! - `GET /tasks/get-all-tasks` - List all tasks
//! - `GET /tasks/get-task/:id` - Get one task

mod routes;
pub mod tasks;
pub mod types;

pub use routes::{router, serve, AppState};
pub use types::*;
