//! Task rules: validation, priority derivation, sorting, filtering and partial updates.
//!
//! Every operation is a single validate-then-mutate step against the injected
//! [`TaskStore`]. Mutual exclusion between concurrent writers is left to the store.

use std::sync::Arc;

use chrono::{Local, NaiveDate};

use super::priority::derive_priority;
use super::task::{parse_due_date, NewTask, Priority, Task, TaskDraft, TaskError, TaskId, TaskPatch};
use crate::task_store::TaskStore;
use crate::util::{parse_bool_literal, strip_whitespace};

/// Source of the current calendar date.
pub type Today = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// Applies task rules on top of a [`TaskStore`].
#[derive(Clone)]
pub struct TaskManager {
    store: Arc<dyn TaskStore>,
    today: Today,
}

impl TaskManager {
    /// Create a manager that reads "today" from the local clock.
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self::with_today(store, Arc::new(|| Local::now().date_naive()))
    }

    /// Create a manager with an explicit date source.
    pub fn with_today(store: Arc<dyn TaskStore>, today: Today) -> Self {
        Self { store, today }
    }

    pub fn store(&self) -> &Arc<dyn TaskStore> {
        &self.store
    }

    fn today(&self) -> NaiveDate {
        (self.today)()
    }

    /// Create a task, deriving its priority from the due date and criticality.
    ///
    /// # Errors
    /// - `InvalidDate` if the due date is malformed or before today
    /// - `InvalidArgument` if the title is blank
    /// - `DuplicateTask` if a task with the same title and due date exists
    pub async fn create_task(&self, new: NewTask) -> Result<Task, TaskError> {
        let due_date = parse_due_date(&new.due_date)?;
        let today = self.today();
        if due_date < today {
            return Err(past_due_date(due_date));
        }
        require_title(&new.title)?;
        if self
            .store
            .find_by_title_and_due_date(&new.title, due_date)
            .await
            .map_err(TaskError::Store)?
            .is_some()
        {
            return Err(TaskError::DuplicateTask {
                title: new.title,
                due_date,
            });
        }

        let draft = TaskDraft {
            id: None,
            priority: derive_priority(due_date, new.is_critical, today),
            title: new.title,
            description: new.description,
            due_date,
            completed: false,
        };
        let task = self.store.save(draft).await.map_err(TaskError::Store)?;
        tracing::info!(
            "Created task {} '{}' due {} with priority {}",
            task.id,
            task.title,
            task.due_date,
            task.priority
        );
        Ok(task)
    }

    /// All tasks sorted by `sort`.
    ///
    /// Whitespace is stripped from the key but case is kept:
    /// - `""` or `"priority"`: by priority (`HIGH` first), then due date
    /// - `"date"`: by due date
    pub async fn list_sorted(&self, sort: Option<&str>) -> Result<Vec<Task>, TaskError> {
        let key = strip_whitespace(sort.unwrap_or_default());
        let mut tasks = self.store.find_all().await.map_err(TaskError::Store)?;
        match key.as_str() {
            "" | "priority" => tasks.sort_by(|a, b| {
                a.priority
                    .cmp(&b.priority)
                    .then_with(|| a.due_date.cmp(&b.due_date))
            }),
            "date" => tasks.sort_by(|a, b| a.due_date.cmp(&b.due_date)),
            _ => return Err(TaskError::UnsupportedSort(key)),
        }
        tracing::debug!("Listed {} tasks sorted by '{}'", tasks.len(), key);
        Ok(tasks)
    }

    /// Tasks matching `filter == value`, for `completed` or `priority`.
    pub async fn list_by_filter(&self, filter: &str, value: &str) -> Result<Vec<Task>, TaskError> {
        let filter = strip_whitespace(filter);
        let value = strip_whitespace(value);

        let tasks = if filter.eq_ignore_ascii_case("completed") {
            let completed =
                parse_bool_literal(&value).ok_or_else(|| TaskError::InvalidFilterValue {
                    filter: "completed".to_string(),
                    value: value.clone(),
                    hint: "Use true or false.",
                })?;
            self.store
                .find_by_completed(completed)
                .await
                .map_err(TaskError::Store)?
        } else if filter.eq_ignore_ascii_case("priority") {
            let priority = Priority::parse(&value).ok_or_else(|| TaskError::InvalidFilterValue {
                filter: "priority".to_string(),
                value: value.clone(),
                hint: "Use high, medium or low.",
            })?;
            self.store
                .find_by_priority(priority)
                .await
                .map_err(TaskError::Store)?
        } else {
            return Err(TaskError::UnsupportedFilter(filter));
        };

        tracing::debug!("Filter {}={} matched {} tasks", filter, value, tasks.len());
        Ok(tasks)
    }

    /// Apply a partial update.
    ///
    /// Fields are applied in a fixed order, and the order is observable:
    /// 1. title
    /// 2. description
    /// 3. due date (must parse and not be before today)
    /// 4. priority: forced to `LOW` when the patch itself sets `completed = true`
    /// 5. completed: setting it to `true` forces `LOW`
    pub async fn update_task(&self, id: TaskId, patch: TaskPatch) -> Result<Task, TaskError> {
        let current = self
            .store
            .find_by_id(id)
            .await
            .map_err(TaskError::Store)?
            .ok_or(TaskError::TaskNotFound(id))?;
        let mut draft = TaskDraft::from(current.clone());

        if let Some(title) = patch.title {
            require_title(&title)?;
            draft.title = title;
        }
        if let Some(description) = patch.description {
            draft.description = Some(description);
        }
        if let Some(due_date) = patch.due_date {
            let due_date = parse_due_date(&due_date)?;
            if due_date < self.today() {
                return Err(past_due_date(due_date));
            }
            draft.due_date = due_date;
        }
        if let Some(priority) = patch.priority {
            // Consults the incoming flag, not the stored one.
            draft.priority = if patch.completed == Some(true) {
                Priority::Low
            } else {
                priority
            };
        }
        if let Some(completed) = patch.completed {
            draft.completed = completed;
            if completed {
                draft.priority = Priority::Low;
            }
        }

        if draft.title != current.title || draft.due_date != current.due_date {
            let clash = self
                .store
                .find_by_title_and_due_date(&draft.title, draft.due_date)
                .await
                .map_err(TaskError::Store)?;
            if clash.is_some_and(|other| other.id != id) {
                return Err(TaskError::DuplicateTask {
                    title: draft.title,
                    due_date: draft.due_date,
                });
            }
        }

        let task = self.store.save(draft).await.map_err(TaskError::Store)?;
        tracing::info!(
            "Updated task {}: priority={} completed={}",
            task.id,
            task.priority,
            task.completed
        );
        Ok(task)
    }

    pub async fn delete_task(&self, id: TaskId) -> Result<(), TaskError> {
        if !self.store.exists_by_id(id).await.map_err(TaskError::Store)? {
            return Err(TaskError::TaskNotFound(id));
        }
        self.store.delete_by_id(id).await.map_err(TaskError::Store)?;
        tracing::info!("Deleted task {}", id);
        Ok(())
    }

    pub async fn get_task(&self, id: TaskId) -> Result<Task, TaskError> {
        self.store
            .find_by_id(id)
            .await
            .map_err(TaskError::Store)?
            .ok_or(TaskError::TaskNotFound(id))
    }

    /// All tasks in store order.
    pub async fn get_all_tasks(&self) -> Result<Vec<Task>, TaskError> {
        self.store.find_all().await.map_err(TaskError::Store)
    }
}

fn past_due_date(due_date: NaiveDate) -> TaskError {
    TaskError::InvalidDate(format!("The due date cannot be in the past: {}", due_date))
}

fn require_title(title: &str) -> Result<(), TaskError> {
    if title.trim().is_empty() {
        return Err(TaskError::InvalidArgument(
            "Task title cannot be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task_store::InMemoryTaskStore;
    use chrono::Days;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 3, 10).unwrap()
    }

    fn in_days(days: u64) -> String {
        (today() + Days::new(days)).format("%Y-%m-%d").to_string()
    }

    fn manager() -> TaskManager {
        TaskManager::with_today(Arc::new(InMemoryTaskStore::new()), Arc::new(today))
    }

    fn new_task(title: &str, due_date: String, is_critical: bool) -> NewTask {
        NewTask {
            title: title.to_string(),
            description: Some("Description".to_string()),
            due_date,
            is_critical,
        }
    }

    async fn create(manager: &TaskManager, title: &str, days: u64) -> Task {
        manager
            .create_task(new_task(title, in_days(days), false))
            .await
            .expect("Failed to create task")
    }

    #[tokio::test]
    async fn test_create_derives_priority_at_boundaries() {
        let manager = manager();
        let cases = [
            (0, false, Priority::High),
            (6, false, Priority::High),
            (7, false, Priority::Medium),
            (19, false, Priority::Medium),
            (20, false, Priority::Low),
            (90, true, Priority::High),
        ];
        for (days, critical, expected) in cases {
            let task = manager
                .create_task(new_task(&format!("T{}", days), in_days(days), critical))
                .await
                .unwrap();
            assert_eq!(
                task.priority, expected,
                "due in {} days (critical={})",
                days, critical
            );
            assert!(!task.completed);
        }
    }

    #[tokio::test]
    async fn test_create_rejects_past_and_malformed_dates() {
        let manager = manager();
        let yesterday = (today() - Days::new(1)).format("%Y-%m-%d").to_string();
        assert!(matches!(
            manager.create_task(new_task("Past", yesterday, false)).await,
            Err(TaskError::InvalidDate(_))
        ));
        assert!(matches!(
            manager
                .create_task(new_task("Bad", "10-03-2030".to_string(), false))
                .await,
            Err(TaskError::InvalidDate(_))
        ));
        assert_eq!(manager.store().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_title() {
        let manager = manager();
        assert!(matches!(
            manager.create_task(new_task("  ", in_days(3), false)).await,
            Err(TaskError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_title_and_date() {
        let manager = manager();
        create(&manager, "Same", 10).await;
        let err = manager
            .create_task(new_task("Same", in_days(10), true))
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::DuplicateTask { .. }));

        // Same title on another day is fine.
        create(&manager, "Same", 11).await;
    }

    #[tokio::test]
    async fn test_list_sorted_by_priority_then_date() {
        let manager = manager();
        let medium = create(&manager, "medium", 10).await;
        let high_late = create(&manager, "high late", 5).await;
        let low = create(&manager, "low", 30).await;
        let high_early = create(&manager, "high early", 1).await;

        let sorted = manager.list_sorted(Some("priority")).await.unwrap();
        let ids: Vec<_> = sorted.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![high_early.id, high_late.id, medium.id, low.id]);

        let default_sorted = manager.list_sorted(None).await.unwrap();
        assert_eq!(default_sorted, sorted);
        let blank_sorted = manager.list_sorted(Some("  ")).await.unwrap();
        assert_eq!(blank_sorted, sorted);
    }

    #[tokio::test]
    async fn test_list_sorted_by_date_ignores_priority() {
        let manager = manager();
        let later = create(&manager, "later", 8).await;
        let critical = manager
            .create_task(new_task("critical", in_days(40), true))
            .await
            .unwrap();
        let sooner = create(&manager, "sooner", 2).await;

        let sorted = manager.list_sorted(Some(" da te ")).await.unwrap();
        let ids: Vec<_> = sorted.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![sooner.id, later.id, critical.id]);
    }

    #[tokio::test]
    async fn test_list_sorted_is_stable_on_ties() {
        let manager = manager();
        let first = create(&manager, "first", 3).await;
        let second = create(&manager, "second", 3).await;
        let sorted = manager.list_sorted(Some("date")).await.unwrap();
        assert_eq!(sorted[0].id, first.id);
        assert_eq!(sorted[1].id, second.id);
    }

    #[tokio::test]
    async fn test_list_sorted_rejects_unknown_keys() {
        let manager = manager();
        assert!(matches!(
            manager.list_sorted(Some("bogus")).await,
            Err(TaskError::UnsupportedSort(key)) if key == "bogus"
        ));
        // Case is not folded for sort keys.
        assert!(matches!(
            manager.list_sorted(Some("Priority")).await,
            Err(TaskError::UnsupportedSort(_))
        ));
    }

    #[tokio::test]
    async fn test_filter_by_completed() {
        let manager = manager();
        let open = create(&manager, "open", 3).await;
        let done = create(&manager, "done", 4).await;
        manager
            .update_task(
                done.id,
                TaskPatch {
                    completed: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let completed = manager.list_by_filter("completed", "true").await.unwrap();
        assert_eq!(completed.iter().map(|t| t.id).collect::<Vec<_>>(), vec![done.id]);

        let pending = manager.list_by_filter(" Completed ", "FALSE").await.unwrap();
        assert_eq!(pending.iter().map(|t| t.id).collect::<Vec<_>>(), vec![open.id]);

        assert!(matches!(
            manager.list_by_filter("completed", "yes").await,
            Err(TaskError::InvalidFilterValue { .. })
        ));
    }

    #[tokio::test]
    async fn test_filter_by_priority() {
        let manager = manager();
        let high = create(&manager, "high", 1).await;
        create(&manager, "medium", 10).await;
        create(&manager, "low", 25).await;

        let tasks = manager.list_by_filter("priority", "HIGH").await.unwrap();
        assert_eq!(tasks.iter().map(|t| t.id).collect::<Vec<_>>(), vec![high.id]);

        let lower = manager.list_by_filter("PRIORITY", " low").await.unwrap();
        assert_eq!(lower.len(), 1);
        assert_eq!(lower[0].priority, Priority::Low);

        assert!(matches!(
            manager.list_by_filter("priority", "urgent").await,
            Err(TaskError::InvalidFilterValue { .. })
        ));
    }

    #[tokio::test]
    async fn test_filter_rejects_unknown_key() {
        let manager = manager();
        assert!(matches!(
            manager.list_by_filter("title", "x").await,
            Err(TaskError::UnsupportedFilter(key)) if key == "title"
        ));
    }

    #[tokio::test]
    async fn test_update_applies_present_fields_only() {
        let manager = manager();
        let task = create(&manager, "Old Title", 10).await;

        let updated = manager
            .update_task(
                task.id,
                TaskPatch {
                    title: Some("New Title".to_string()),
                    due_date: Some(in_days(15)),
                    priority: Some(Priority::High),
                    completed: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, task.id);
        assert_eq!(updated.title, "New Title");
        assert_eq!(updated.description, task.description);
        assert_eq!(updated.priority, Priority::High);
        assert_eq!(updated.due_date, today() + Days::new(15));
        assert_eq!(manager.get_task(task.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_completing_forces_low_priority() {
        let manager = manager();
        let task = create(&manager, "Finish", 1).await;
        assert_eq!(task.priority, Priority::High);

        let updated = manager
            .update_task(
                task.id,
                TaskPatch {
                    priority: Some(Priority::High),
                    completed: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.completed);
        assert_eq!(updated.priority, Priority::Low);

        let stored = manager.get_task(task.id).await.unwrap();
        assert_eq!(stored.priority, Priority::Low);
    }

    #[tokio::test]
    async fn test_priority_update_uses_incoming_completed_flag() {
        let manager = manager();
        let task = create(&manager, "Done already", 25).await;
        manager
            .update_task(
                task.id,
                TaskPatch {
                    completed: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        // The stored task is completed, but the patch does not say so.
        let updated = manager
            .update_task(
                task.id,
                TaskPatch {
                    priority: Some(Priority::Medium),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.completed);
        assert_eq!(updated.priority, Priority::Medium);
    }

    #[tokio::test]
    async fn test_update_rejects_bad_due_dates() {
        let manager = manager();
        let task = create(&manager, "Dated", 5).await;
        let yesterday = (today() - Days::new(1)).format("%Y-%m-%d").to_string();

        for due_date in [yesterday, "2030/03/20".to_string()] {
            let err = manager
                .update_task(
                    task.id,
                    TaskPatch {
                        due_date: Some(due_date),
                        ..Default::default()
                    },
                )
                .await
                .unwrap_err();
            assert!(matches!(err, TaskError::InvalidDate(_)));
        }
        assert_eq!(manager.get_task(task.id).await.unwrap(), task);
    }

    #[tokio::test]
    async fn test_update_rejects_clash_with_other_task() {
        let manager = manager();
        create(&manager, "Taken", 5).await;
        let other = create(&manager, "Other", 5).await;

        let err = manager
            .update_task(
                other.id,
                TaskPatch {
                    title: Some("Taken".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::DuplicateTask { .. }));

        // Re-sending the task's own title is not a clash.
        manager
            .update_task(
                other.id,
                TaskPatch {
                    title: Some("Other".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_missing_ids_are_not_found() {
        let manager = manager();
        let missing = TaskId::new(42);
        assert_eq!(
            manager
                .update_task(missing, TaskPatch::default())
                .await
                .unwrap_err(),
            TaskError::TaskNotFound(missing)
        );
        assert_eq!(
            manager.delete_task(missing).await.unwrap_err(),
            TaskError::TaskNotFound(missing)
        );
        assert_eq!(
            manager.get_task(missing).await.unwrap_err(),
            TaskError::TaskNotFound(missing)
        );
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let manager = manager();
        let keep = create(&manager, "keep", 3).await;
        let gone = create(&manager, "gone", 3).await;

        manager.delete_task(gone.id).await.unwrap();
        assert_eq!(
            manager.get_task(gone.id).await.unwrap_err(),
            TaskError::TaskNotFound(gone.id)
        );

        let all = manager.get_all_tasks().await.unwrap();
        assert_eq!(all, vec![keep]);
    }
}
