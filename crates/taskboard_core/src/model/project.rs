//! Project record, ordered per owner.

use super::{OwnerId, ProjectId};
use crate::reorder::Positioned;
use serde::{Deserialize, Serialize};

/// Name used when a project is created without one.
pub const DEFAULT_PROJECT_NAME: &str = "Unnamed";

/// Project lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Pending,
    Active,
    Completed,
    Archived,
}

impl ProjectStatus {
    /// Storage/wire name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Archived => "archived",
        }
    }

    /// Parses a storage/wire name; `None` for unknown values.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

/// Persisted project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub uuid: ProjectId,
    /// Scope key; never changes after creation.
    pub owner_id: OwnerId,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    /// 1-based rank among the owner's projects.
    pub position: u32,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms update timestamp.
    pub updated_at: i64,
}

impl Positioned for Project {
    type Id = ProjectId;

    fn item_id(&self) -> ProjectId {
        self.uuid
    }

    fn position(&self) -> u32 {
        self.position
    }
}

/// Input for creating a project. Position is decided by the reorder engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDraft {
    pub owner_id: OwnerId,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
}

impl ProjectDraft {
    pub fn new(owner_id: OwnerId, name: impl Into<String>) -> Self {
        Self {
            owner_id,
            name: name.into(),
            description: None,
            status: ProjectStatus::default(),
        }
    }
}

/// Partial update of the non-positional project fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPatch {
    pub name: Option<String>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
    pub status: Option<ProjectStatus>,
}

#[cfg(test)]
mod tests {
    use super::{Project, ProjectStatus};
    use crate::reorder;
    use uuid::Uuid;

    fn project(owner_id: Uuid, name: &str, position: u32) -> Project {
        Project {
            uuid: Uuid::new_v4(),
            owner_id,
            name: name.to_string(),
            description: None,
            status: ProjectStatus::Pending,
            position,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn status_names_roundtrip() {
        for status in [
            ProjectStatus::Pending,
            ProjectStatus::Active,
            ProjectStatus::Completed,
            ProjectStatus::Archived,
        ] {
            assert_eq!(ProjectStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ProjectStatus::parse("paused"), None);
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&ProjectStatus::Active).unwrap();
        assert_eq!(json, "\"active\"");
    }

    #[test]
    fn owner_projects_move_to_the_end() {
        let owner = Uuid::new_v4();
        let projects = vec![
            project(owner, "Home", 1),
            project(owner, "Work", 2),
            project(owner, "Garden", 3),
        ];

        let changes = reorder::move_to(&projects, projects[0].uuid, 3).unwrap();

        assert_eq!(
            changes.repositioned().collect::<Vec<_>>(),
            vec![
                (projects[0].uuid, 3),
                (projects[1].uuid, 1),
                (projects[2].uuid, 2)
            ]
        );
        let inserted = reorder::insert_at(&projects, Uuid::new_v4(), Some(2)).unwrap();
        assert_eq!(inserted.len(), 3);
    }
}
