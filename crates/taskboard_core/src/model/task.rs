//! Task record, ordered per column.

use super::{ColumnId, ProjectId, TaskId, UserId};
use crate::reorder::Positioned;
use serde::{Deserialize, Serialize};

/// Task progress state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Idle,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::InProgress => "in_progress",
            Self::Done => "done",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "idle" => Some(Self::Idle),
            "in_progress" => Some(Self::InProgress),
            "done" => Some(Self::Done),
            _ => None,
        }
    }
}

/// Persisted task.
///
/// `project_uuid` is denormalized from the owning column so project-wide
/// queries do not need a join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub uuid: TaskId,
    pub project_uuid: ProjectId,
    /// Scope key. Only changes through relocation, which leaves the source
    /// scope and enters the target scope as two engine operations.
    pub column_uuid: ColumnId,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: i32,
    pub assignee_id: Option<UserId>,
    /// 1-based rank among the column's tasks.
    pub position: u32,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Positioned for Task {
    type Id = TaskId;

    fn item_id(&self) -> TaskId {
        self.uuid
    }

    fn position(&self) -> u32 {
        self.position
    }
}

/// Input for creating a task. The project is taken from the column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub column_uuid: ColumnId,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: i32,
    pub assignee_id: Option<UserId>,
}

impl TaskDraft {
    pub fn new(column_uuid: ColumnId, title: impl Into<String>) -> Self {
        Self {
            column_uuid,
            title: title.into(),
            description: None,
            status: TaskStatus::default(),
            priority: 0,
            assignee_id: None,
        }
    }
}

/// Partial update of the non-positional task fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<i32>,
    /// `Some(None)` unassigns the task.
    pub assignee_id: Option<Option<UserId>>,
}
