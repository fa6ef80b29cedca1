//! In-memory task store (non-persistent).

use super::{sorted_by_id, TaskStore};
use crate::task::{Priority, Task, TaskDraft, TaskId};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Inner {
    tasks: BTreeMap<TaskId, Task>,
    /// Last id handed out; ids are never reused.
    last_id: i64,
}

#[derive(Clone, Default)]
pub struct InMemoryTaskStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    fn is_persistent(&self) -> bool {
        false
    }

    async fn save(&self, draft: TaskDraft) -> Result<Task, String> {
        let mut inner = self.inner.write().await;
        let id = match draft.id {
            Some(id) => {
                inner.last_id = inner.last_id.max(id.as_i64());
                id
            }
            None => {
                inner.last_id += 1;
                TaskId::new(inner.last_id)
            }
        };
        let task = draft.into_task(id);
        inner.tasks.insert(id, task.clone());
        Ok(task)
    }

    async fn find_by_id(&self, id: TaskId) -> Result<Option<Task>, String> {
        Ok(self.inner.read().await.tasks.get(&id).cloned())
    }

    async fn find_by_title_and_due_date(
        &self,
        title: &str,
        due_date: NaiveDate,
    ) -> Result<Option<Task>, String> {
        Ok(self
            .inner
            .read()
            .await
            .tasks
            .values()
            .find(|t| t.title == title && t.due_date == due_date)
            .cloned())
    }

    async fn find_by_completed(&self, completed: bool) -> Result<Vec<Task>, String> {
        let inner = self.inner.read().await;
        Ok(sorted_by_id(
            inner.tasks.values().filter(|t| t.completed == completed),
        ))
    }

    async fn find_by_priority(&self, priority: Priority) -> Result<Vec<Task>, String> {
        let inner = self.inner.read().await;
        Ok(sorted_by_id(
            inner.tasks.values().filter(|t| t.priority == priority),
        ))
    }

    async fn find_all(&self) -> Result<Vec<Task>, String> {
        Ok(self.inner.read().await.tasks.values().cloned().collect())
    }

    async fn delete_by_id(&self, id: TaskId) -> Result<(), String> {
        self.inner.write().await.tasks.remove(&id);
        Ok(())
    }

    async fn exists_by_id(&self, id: TaskId) -> Result<bool, String> {
        Ok(self.inner.read().await.tasks.contains_key(&id))
    }

    async fn count(&self) -> Result<usize, String> {
        Ok(self.inner.read().await.tasks.len())
    }
}
