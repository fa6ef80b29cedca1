//! JSON file-based task store.

use super::{sorted_by_id, TaskStore};
use crate::task::{Priority, Task, TaskDraft, TaskId};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tokio::sync::{Mutex, RwLock};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct TaskStoreSnapshot {
    next_id: i64,
    tasks: Vec<Task>,
}

#[derive(Clone)]
pub struct FileTaskStore {
    path: PathBuf,
    snapshot: Arc<RwLock<TaskStoreSnapshot>>,
    persist_lock: Arc<Mutex<()>>,
}

impl FileTaskStore {
    pub async fn new(base_dir: PathBuf) -> Result<Self, String> {
        fs::create_dir_all(&base_dir)
            .await
            .map_err(|e| format!("Failed to create task store dir: {}", e))?;
        let path = base_dir.join("tasks.json");
        let mut snapshot = match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<TaskStoreSnapshot>(&bytes)
                .map_err(|e| format!("Failed to parse task store {}: {}", path.display(), e))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                TaskStoreSnapshot::default()
            }
            Err(err) => {
                return Err(format!(
                    "Failed to read task store {}: {}",
                    path.display(),
                    err
                ))
            }
        };

        // Hand-edited files may lag behind their contents.
        let max_id = snapshot.tasks.iter().map(|t| t.id.as_i64()).max().unwrap_or(0);
        snapshot.next_id = snapshot.next_id.max(max_id + 1).max(1);
        snapshot.tasks.sort_by_key(|t| t.id);

        tracing::debug!(
            "Loaded {} tasks from {}",
            snapshot.tasks.len(),
            path.display()
        );

        Ok(Self {
            path,
            snapshot: Arc::new(RwLock::new(snapshot)),
            persist_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Apply a change to a copy of the snapshot, write the copy, then swap it in.
    ///
    /// `apply` reports whether it changed anything; unchanged snapshots are not
    /// written. A failed write leaves the in-memory state untouched.
    async fn commit<T>(
        &self,
        apply: impl FnOnce(&mut TaskStoreSnapshot) -> (T, bool),
    ) -> Result<T, String> {
        let _guard = self.persist_lock.lock().await;
        let mut next = self.snapshot.read().await.clone();
        let (out, changed) = apply(&mut next);
        if changed {
            self.write_snapshot(&next).await?;
            *self.snapshot.write().await = next;
        }
        Ok(out)
    }

    async fn write_snapshot(&self, snapshot: &TaskStoreSnapshot) -> Result<(), String> {
        let data = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| format!("Failed to serialize task store: {}", e))?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, data)
            .await
            .map_err(|e| format!("Failed to write task store: {}", e))?;
        fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| format!("Failed to finalize task store: {}", e))?;
        Ok(())
    }
}

#[async_trait]
impl TaskStore for FileTaskStore {
    fn is_persistent(&self) -> bool {
        true
    }

    async fn save(&self, draft: TaskDraft) -> Result<Task, String> {
        self.commit(|snapshot| {
            let task = match draft.id {
                Some(id) => {
                    let task = draft.into_task(id);
                    match snapshot.tasks.iter_mut().find(|t| t.id == id) {
                        Some(slot) => *slot = task.clone(),
                        None => {
                            snapshot.tasks.push(task.clone());
                            snapshot.tasks.sort_by_key(|t| t.id);
                            snapshot.next_id = snapshot.next_id.max(id.as_i64() + 1);
                        }
                    }
                    task
                }
                None => {
                    let id = TaskId::new(snapshot.next_id);
                    snapshot.next_id += 1;
                    let task = draft.into_task(id);
                    snapshot.tasks.push(task.clone());
                    task
                }
            };
            (task, true)
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> Result<Option<Task>, String> {
        Ok(self
            .snapshot
            .read()
            .await
            .tasks
            .iter()
            .find(|t| t.id == id)
            .cloned())
    }

    async fn find_by_title_and_due_date(
        &self,
        title: &str,
        due_date: NaiveDate,
    ) -> Result<Option<Task>, String> {
        Ok(self
            .snapshot
            .read()
            .await
            .tasks
            .iter()
            .find(|t| t.title == title && t.due_date == due_date)
            .cloned())
    }

    async fn find_by_completed(&self, completed: bool) -> Result<Vec<Task>, String> {
        let snapshot = self.snapshot.read().await;
        Ok(sorted_by_id(
            snapshot.tasks.iter().filter(|t| t.completed == completed),
        ))
    }

    async fn find_by_priority(&self, priority: Priority) -> Result<Vec<Task>, String> {
        let snapshot = self.snapshot.read().await;
        Ok(sorted_by_id(
            snapshot.tasks.iter().filter(|t| t.priority == priority),
        ))
    }

    async fn find_all(&self) -> Result<Vec<Task>, String> {
        Ok(self.snapshot.read().await.tasks.clone())
    }

    async fn delete_by_id(&self, id: TaskId) -> Result<(), String> {
        self.commit(|snapshot| {
            let before = snapshot.tasks.len();
            snapshot.tasks.retain(|t| t.id != id);
            ((), snapshot.tasks.len() != before)
        })
        .await
    }

    async fn count(&self) -> Result<usize, String> {
        Ok(self.snapshot.read().await.tasks.len())
    }
}
