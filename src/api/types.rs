//! API request and response types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::task::{NewTask, Priority, Task, TaskError, TaskId, TaskPatch};
use crate::util::parse_bool_literal;

/// A boolean that may arrive as a JSON bool or as a `"true"`/`"false"` string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BoolLike {
    Bool(bool),
    Text(String),
}

impl BoolLike {
    /// Resolve to a bool, rejecting anything but `true`/`false` (any case).
    pub fn resolve(&self, field: &str) -> Result<bool, TaskError> {
        match self {
            BoolLike::Bool(b) => Ok(*b),
            BoolLike::Text(s) => parse_bool_literal(s).ok_or_else(|| {
                TaskError::InvalidArgument(format!(
                    "Invalid value for {}: {}. Use true or false.",
                    field, s
                ))
            }),
        }
    }
}

/// Request to create a task.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Due date as `yyyy-MM-dd`
    pub due_date: String,

    /// Forces HIGH priority (defaults to false)
    #[serde(default)]
    pub is_critical: Option<BoolLike>,
}

impl TryFrom<CreateTaskRequest> for NewTask {
    type Error = TaskError;

    fn try_from(req: CreateTaskRequest) -> Result<Self, Self::Error> {
        let is_critical = match &req.is_critical {
            Some(value) => value.resolve("critical status")?,
            None => false,
        };
        Ok(NewTask {
            title: req.title,
            description: req.description,
            due_date: req.due_date,
            is_critical,
        })
    }
}

/// Partial update of a task. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub priority: Option<String>,
    pub is_completed: Option<BoolLike>,
}

impl TryFrom<UpdateTaskRequest> for TaskPatch {
    type Error = TaskError;

    fn try_from(req: UpdateTaskRequest) -> Result<Self, Self::Error> {
        let priority = req
            .priority
            .as_deref()
            .map(|p| {
                Priority::parse(p.trim()).ok_or_else(|| {
                    TaskError::InvalidArgument(format!(
                        "Invalid priority: {}. Use high, medium or low.",
                        p
                    ))
                })
            })
            .transpose()?;
        let completed = req
            .is_completed
            .as_ref()
            .map(|v| v.resolve("completed status"))
            .transpose()?;
        Ok(TaskPatch {
            title: req.title,
            description: req.description,
            due_date: req.due_date,
            priority,
            completed,
        })
    }
}

/// Task as returned by create, update, sort and filter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskDto {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub due_date: NaiveDate,
    pub is_completed: bool,
}

impl From<Task> for TaskDto {
    fn from(t: Task) -> Self {
        Self {
            id: t.id,
            title: t.title,
            description: t.description,
            priority: t.priority,
            due_date: t.due_date,
            is_completed: t.completed,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SortQuery {
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilterQuery {
    pub filter: String,
    pub value: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,

    /// Active storage backend ("memory", "file", "sqlite")
    pub store: String,

    /// Whether tasks survive a restart
    pub persistent: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_accepts_string_booleans() {
        let req: CreateTaskRequest = serde_json::from_str(
            r#"{"title":"t","dueDate":"2030-01-01","isCritical":"TRUE"}"#,
        )
        .unwrap();
        let new = NewTask::try_from(req).unwrap();
        assert!(new.is_critical);
        assert_eq!(new.description, None);
    }

    #[test]
    fn test_create_request_rejects_non_boolean_critical() {
        let req: CreateTaskRequest = serde_json::from_str(
            r#"{"title":"t","dueDate":"2030-01-01","isCritical":"maybe"}"#,
        )
        .unwrap();
        assert!(matches!(
            NewTask::try_from(req),
            Err(TaskError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_update_request_maps_is_completed() {
        let req: UpdateTaskRequest =
            serde_json::from_str(r#"{"priority":"high","isCompleted":true}"#).unwrap();
        let patch = TaskPatch::try_from(req).unwrap();
        assert_eq!(patch.priority, Some(Priority::High));
        assert_eq!(patch.completed, Some(true));
        assert!(patch.title.is_none());
        assert!(patch.due_date.is_none());
    }

    #[test]
    fn test_update_request_rejects_unknown_priority() {
        let req = UpdateTaskRequest {
            priority: Some("urgent".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            TaskPatch::try_from(req),
            Err(TaskError::InvalidArgument(_))
        ));
    }
}
