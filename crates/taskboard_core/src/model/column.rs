//! Board column record, ordered per project.

use super::{ColumnId, ProjectId};
use crate::reorder::Positioned;
use serde::{Deserialize, Serialize};

/// Persisted board column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardColumn {
    pub uuid: ColumnId,
    /// Scope key; never changes after creation.
    pub project_uuid: ProjectId,
    pub name: String,
    /// 1-based rank among the project's columns.
    pub position: u32,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Positioned for BoardColumn {
    type Id = ColumnId;

    fn item_id(&self) -> ColumnId {
        self.uuid
    }

    fn position(&self) -> u32 {
        self.position
    }
}

/// Input for creating a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDraft {
    pub project_uuid: ProjectId,
    pub name: String,
}

impl ColumnDraft {
    pub fn new(project_uuid: ProjectId, name: impl Into<String>) -> Self {
        Self {
            project_uuid,
            name: name.into(),
        }
    }
}
