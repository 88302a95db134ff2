//! Task use-case service.
//!
//! # Invariants
//! - Task titles are trimmed and non-blank.
//! - Relocation stays inside one project.

use super::{normalize_name, track, BoardServiceError, BoardServiceResult, Reordered};
use crate::model::task::{Task, TaskDraft, TaskPatch};
use crate::model::{ColumnId, TaskId, UserId};
use crate::reorder::ChangeSet;
use crate::repo::task_repo::{Relocation, TaskRepository};
use crate::repo::EntityKind;
use log::info;

/// Task service facade.
pub struct TaskService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> TaskService<R> {
    /// Creates service from repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a task at `position` in its column, or last when `None`.
    pub fn create_task(
        &self,
        mut draft: TaskDraft,
        position: Option<u32>,
    ) -> BoardServiceResult<Task> {
        draft.title =
            normalize_name(&draft.title).ok_or(BoardServiceError::InvalidName(EntityKind::Task))?;
        draft.description = draft.description.as_deref().and_then(normalize_name);
        let task = track(
            EntityKind::Task,
            "create",
            self.repo.create_task(&draft, position),
        )?;
        info!(
            "event=task_create module=service status=ok task={} column={} position={}",
            task.uuid, task.column_uuid, task.position
        );
        Ok(task)
    }

    /// Loads one task.
    pub fn get_task(&self, id: TaskId) -> BoardServiceResult<Task> {
        track(EntityKind::Task, "get", self.repo.get_task(id))?.ok_or(
            BoardServiceError::NotFound {
                kind: EntityKind::Task,
                id,
            },
        )
    }

    /// Lists one column's tasks in order.
    pub fn list_tasks(&self, column_uuid: ColumnId) -> BoardServiceResult<Vec<Task>> {
        track(EntityKind::Task, "list", self.repo.list_tasks(column_uuid))
    }

    /// Lists one user's assigned tasks, grouped by project and column.
    pub fn list_tasks_for_assignee(&self, assignee: UserId) -> BoardServiceResult<Vec<Task>> {
        track(
            EntityKind::Task,
            "list_assigned",
            self.repo.list_tasks_for_assignee(assignee),
        )
    }

    /// Updates title, description, status, priority or assignee. Position is
    /// untouched.
    pub fn update_task(&self, id: TaskId, mut patch: TaskPatch) -> BoardServiceResult<Task> {
        if let Some(title) = patch.title.take() {
            patch.title =
                Some(normalize_name(&title).ok_or(BoardServiceError::InvalidName(EntityKind::Task))?);
        }
        patch.description = patch
            .description
            .map(|value| value.as_deref().and_then(normalize_name));
        track(EntityKind::Task, "update", self.repo.update_task(id, &patch))
    }

    /// Moves a task to `target` within its column.
    pub fn move_task(&self, id: TaskId, target: u32) -> BoardServiceResult<Reordered<Task>> {
        let changes = track(EntityKind::Task, "move", self.repo.move_task(id, target))?;
        info!(
            "event=task_move module=service status=ok task={} target={} changed={}",
            id,
            target,
            changes.len()
        );
        Ok(Reordered {
            item: self.get_task(id)?,
            changes,
        })
    }

    /// Moves a task into `target_column`, appending when `position` is `None`.
    pub fn relocate_task(
        &self,
        id: TaskId,
        target_column: ColumnId,
        position: Option<u32>,
    ) -> BoardServiceResult<(Task, Relocation)> {
        let relocation = track(
            EntityKind::Task,
            "relocate",
            self.repo.relocate_task(id, target_column, position),
        )?;
        Ok((self.get_task(id)?, relocation))
    }

    /// Deletes a task.
    pub fn delete_task(&self, id: TaskId) -> BoardServiceResult<ChangeSet<TaskId>> {
        let changes = track(EntityKind::Task, "delete", self.repo.delete_task(id))?;
        info!(
            "event=task_delete module=service status=ok task={} changed={}",
            id,
            changes.len()
        );
        Ok(changes)
    }
}
