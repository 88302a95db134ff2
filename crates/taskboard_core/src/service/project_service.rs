//! Project use-case service.
//!
//! # Responsibility
//! - Normalize project input before it reaches the repository.
//! - Return reordered projects together with every shifted sibling.
//!
//! # Invariants
//! - A blank project name falls back to `DEFAULT_PROJECT_NAME`.

use super::{normalize_name, track, BoardServiceError, BoardServiceResult, Reordered};
use crate::model::project::{Project, ProjectDraft, ProjectPatch, DEFAULT_PROJECT_NAME};
use crate::model::{OwnerId, ProjectId};
use crate::reorder::ChangeSet;
use crate::repo::project_repo::ProjectRepository;
use crate::repo::EntityKind;
use log::info;

/// Project service facade.
pub struct ProjectService<R: ProjectRepository> {
    repo: R,
}

impl<R: ProjectRepository> ProjectService<R> {
    /// Creates service from repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a project at `position`, or last when `None`.
    pub fn create_project(
        &self,
        mut draft: ProjectDraft,
        position: Option<u32>,
    ) -> BoardServiceResult<Project> {
        draft.name =
            normalize_name(&draft.name).unwrap_or_else(|| DEFAULT_PROJECT_NAME.to_string());
        draft.description = draft.description.as_deref().and_then(normalize_name);
        let project = track(
            EntityKind::Project,
            "create",
            self.repo.create_project(&draft, position),
        )?;
        info!(
            "event=project_create module=service status=ok project={} position={}",
            project.uuid, project.position
        );
        Ok(project)
    }

    /// Loads one project.
    pub fn get_project(&self, id: ProjectId) -> BoardServiceResult<Project> {
        track(EntityKind::Project, "get", self.repo.get_project(id))?.ok_or(
            BoardServiceError::NotFound {
                kind: EntityKind::Project,
                id,
            },
        )
    }

    /// Lists one owner's projects in order.
    pub fn list_projects(&self, owner_id: OwnerId) -> BoardServiceResult<Vec<Project>> {
        track(EntityKind::Project, "list", self.repo.list_projects(owner_id))
    }

    /// Updates name, description or status. Position is untouched.
    pub fn update_project(
        &self,
        id: ProjectId,
        mut patch: ProjectPatch,
    ) -> BoardServiceResult<Project> {
        if let Some(name) = patch.name.take() {
            patch.name = Some(
                normalize_name(&name).ok_or(BoardServiceError::InvalidName(EntityKind::Project))?,
            );
        }
        patch.description = patch
            .description
            .map(|value| value.as_deref().and_then(normalize_name));
        track(
            EntityKind::Project,
            "update",
            self.repo.update_project(id, &patch),
        )
    }

    /// Moves a project to `target` within its owner's order.
    pub fn move_project(
        &self,
        id: ProjectId,
        target: u32,
    ) -> BoardServiceResult<Reordered<Project>> {
        let changes = track(EntityKind::Project, "move", self.repo.move_project(id, target))?;
        info!(
            "event=project_move module=service status=ok project={} target={} changed={}",
            id,
            target,
            changes.len()
        );
        Ok(Reordered {
            item: self.get_project(id)?,
            changes,
        })
    }

    /// Deletes a project with its columns and tasks.
    pub fn delete_project(&self, id: ProjectId) -> BoardServiceResult<ChangeSet<ProjectId>> {
        let changes = track(EntityKind::Project, "delete", self.repo.delete_project(id))?;
        info!(
            "event=project_delete module=service status=ok project={} changed={}",
            id,
            changes.len()
        );
        Ok(changes)
    }
}
