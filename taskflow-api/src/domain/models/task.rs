use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{ProjectId, TaskId};

/// Task workflow state. No transition graph is enforced: any state is
/// reachable from any other through an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Open,
    InProgress,
    Done,
}

impl TaskStatus {
    /// The state a freshly created task starts in.
    pub fn initial() -> Self {
        Self::Open
    }
}

/// Five-level task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    VeryHigh,
    High,
    Medium,
    Low,
    VeryLow,
}

impl Default for TaskPriority {
    fn default() -> Self {
        Self::Medium
    }
}

/// A task inside a project.
///
/// A task has no owner field of its own; it is accessible to exactly the
/// user that owns its parent project.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub slug: String,
    pub project_id: ProjectId,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Fields required to insert a new task.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub slug: String,
    pub project_id: ProjectId,
}

/// A partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            r#""IN_PROGRESS""#
        );
        assert_eq!(
            serde_json::from_str::<TaskStatus>(r#""DONE""#).unwrap(),
            TaskStatus::Done
        );
    }

    #[test]
    fn priority_defaults_to_medium() {
        assert_eq!(TaskPriority::default(), TaskPriority::Medium);
        assert_eq!(
            serde_json::to_string(&TaskPriority::VeryHigh).unwrap(),
            r#""VERY_HIGH""#
        );
    }
}
