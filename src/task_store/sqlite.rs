//! SQLite-based task store.

use super::TaskStore;
use crate::task::{Priority, Task, TaskDraft, TaskId, DUE_DATE_FORMAT};
use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

const SCHEMA: &str = r#"
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT,
    priority TEXT NOT NULL,
    due_date TEXT NOT NULL,
    completed INTEGER NOT NULL DEFAULT 0
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_tasks_title_due_date ON tasks(title, due_date);
CREATE INDEX IF NOT EXISTS idx_tasks_completed ON tasks(completed);
CREATE INDEX IF NOT EXISTS idx_tasks_priority ON tasks(priority);
"#;

const SELECT_COLUMNS: &str = "SELECT id, title, description, priority, due_date, completed FROM tasks";

pub struct SqliteTaskStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteTaskStore {
    pub async fn new(base_dir: PathBuf) -> Result<Self, String> {
        let db_path = base_dir.join("tasks.db");

        tokio::fs::create_dir_all(&base_dir)
            .await
            .map_err(|e| format!("Failed to create task store dir: {}", e))?;

        // Open database in blocking task
        let conn = tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&db_path)
                .map_err(|e| format!("Failed to open SQLite database: {}", e))?;
            conn.execute_batch(SCHEMA)
                .map_err(|e| format!("Failed to run schema: {}", e))?;
            Ok::<_, String>(conn)
        })
        .await
        .map_err(|e| format!("Task join error: {}", e))??;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, String>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            f(&conn).map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| e.to_string())?
    }

    async fn query_tasks<P>(&self, sql: String, args: P) -> Result<Vec<Task>, String>
    where
        P: rusqlite::Params + Send + 'static,
    {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let tasks = stmt
                .query_map(args, row_to_task)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(tasks)
        })
        .await
    }
}

fn row_to_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    let priority_str: String = row.get(3)?;
    let due_date_str: String = row.get(4)?;
    let priority = Priority::parse(&priority_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("unknown priority '{}'", priority_str).into(),
        )
    })?;
    let due_date = NaiveDate::parse_from_str(&due_date_str, DUE_DATE_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Task {
        id: TaskId::new(row.get(0)?),
        title: row.get(1)?,
        description: row.get(2)?,
        priority,
        due_date,
        completed: row.get::<_, i32>(5)? != 0,
    })
}

fn format_date(date: NaiveDate) -> String {
    date.format(DUE_DATE_FORMAT).to_string()
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    fn is_persistent(&self) -> bool {
        true
    }

    async fn save(&self, draft: TaskDraft) -> Result<Task, String> {
        self.with_conn(move |conn| {
            let due_date = format_date(draft.due_date);
            let completed = if draft.completed { 1 } else { 0 };
            let id = match draft.id {
                Some(id) => {
                    conn.execute(
                        "INSERT INTO tasks (id, title, description, priority, due_date, completed)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                         ON CONFLICT(id) DO UPDATE SET
                             title = excluded.title,
                             description = excluded.description,
                             priority = excluded.priority,
                             due_date = excluded.due_date,
                             completed = excluded.completed",
                        params![
                            id.as_i64(),
                            draft.title,
                            draft.description,
                            draft.priority.as_str(),
                            due_date,
                            completed,
                        ],
                    )?;
                    id
                }
                None => {
                    conn.execute(
                        "INSERT INTO tasks (title, description, priority, due_date, completed)
                         VALUES (?1, ?2, ?3, ?4, ?5)",
                        params![
                            draft.title,
                            draft.description,
                            draft.priority.as_str(),
                            due_date,
                            completed,
                        ],
                    )?;
                    TaskId::new(conn.last_insert_rowid())
                }
            };
            Ok(draft.into_task(id))
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> Result<Option<Task>, String> {
        self.with_conn(move |conn| {
            conn.query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![id.as_i64()],
                row_to_task,
            )
            .optional()
        })
        .await
    }

    async fn find_by_title_and_due_date(
        &self,
        title: &str,
        due_date: NaiveDate,
    ) -> Result<Option<Task>, String> {
        let title = title.to_string();
        let due_date = format_date(due_date);
        self.with_conn(move |conn| {
            conn.query_row(
                &format!("{} WHERE title = ?1 AND due_date = ?2", SELECT_COLUMNS),
                params![title, due_date],
                row_to_task,
            )
            .optional()
        })
        .await
    }

    async fn find_by_completed(&self, completed: bool) -> Result<Vec<Task>, String> {
        self.query_tasks(
            format!("{} WHERE completed = ?1 ORDER BY id", SELECT_COLUMNS),
            [if completed { 1 } else { 0 }],
        )
        .await
    }

    async fn find_by_priority(&self, priority: Priority) -> Result<Vec<Task>, String> {
        self.query_tasks(
            format!("{} WHERE priority = ?1 ORDER BY id", SELECT_COLUMNS),
            [priority.as_str()],
        )
        .await
    }

    async fn find_all(&self) -> Result<Vec<Task>, String> {
        self.query_tasks(format!("{} ORDER BY id", SELECT_COLUMNS), [])
            .await
    }

    async fn delete_by_id(&self, id: TaskId) -> Result<(), String> {
        self.with_conn(move |conn| {
            conn.execute("DELETE FROM tasks WHERE id = ?1", params![id.as_i64()])?;
            Ok(())
        })
        .await
    }

    async fn exists_by_id(&self, id: TaskId) -> Result<bool, String> {
        self.with_conn(move |conn| {
            conn.prepare("SELECT 1 FROM tasks WHERE id = ?1")?
                .exists(params![id.as_i64()])
        })
        .await
    }

    async fn count(&self) -> Result<usize, String> {
        self.with_conn(|conn| {
            conn.query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get::<_, i64>(0))
        })
        .await
        .map(|n| n as usize)
    }
}
