//! Startup seeding of demo tasks.
//!
//! Writes straight through the [`TaskStore`] so the fixed, historical due dates
//! are not rejected by the manager's date rules.

use chrono::NaiveDate;

use crate::task::{Priority, TaskDraft};
use crate::task_store::TaskStore;

fn demo_task(
    n: u32,
    priority: Priority,
    (year, month, day): (i32, u32, u32),
    completed: bool,
) -> Option<TaskDraft> {
    Some(TaskDraft {
        id: None,
        title: format!("Test Task {}", n),
        description: Some(format!("Description for Test task {}", n)),
        priority,
        due_date: NaiveDate::from_ymd_opt(year, month, day)?,
        completed,
    })
}

fn demo_tasks() -> Vec<TaskDraft> {
    [
        demo_task(1, Priority::High, (2025, 2, 1), true),
        demo_task(2, Priority::Medium, (2025, 3, 1), false),
        demo_task(3, Priority::Low, (2025, 4, 1), false),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Seed the demo tasks if the store is empty. Returns how many were written.
pub async fn seed_if_empty(store: &dyn TaskStore) -> Result<usize, String> {
    if store.count().await? > 0 {
        tracing::debug!("Task store already populated, skipping seed");
        return Ok(0);
    }

    let mut written = 0;
    for draft in demo_tasks() {
        store.save(draft).await?;
        written += 1;
    }
    tracing::info!("Task store seeded with {} demo tasks", written);
    Ok(written)
}
