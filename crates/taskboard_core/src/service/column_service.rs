//! Board column use-case service and board view.
//!
//! # Invariants
//! - Column names are trimmed and non-blank.
//! - The board view lists columns in position order, each with its tasks in
//!   position order.

use super::{ensure_dense, normalize_name, track, BoardServiceError, BoardServiceResult, Reordered};
use crate::model::column::{BoardColumn, ColumnDraft};
use crate::model::task::Task;
use crate::model::{ColumnId, ProjectId};
use crate::reorder::ChangeSet;
use crate::repo::column_repo::ColumnRepository;
use crate::repo::task_repo::TaskRepository;
use crate::repo::EntityKind;
use log::info;
use serde::Serialize;

/// One column with its tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardLane {
    pub column: BoardColumn,
    pub tasks: Vec<Task>,
}

/// Ordered columns of one project with their tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    pub project_uuid: ProjectId,
    pub lanes: Vec<BoardLane>,
}

/// Column service facade. Task access is only used for the board view.
pub struct ColumnService<C: ColumnRepository, T: TaskRepository> {
    columns: C,
    tasks: T,
}

impl<C: ColumnRepository, T: TaskRepository> ColumnService<C, T> {
    /// Creates service from repository implementations.
    pub fn new(columns: C, tasks: T) -> Self {
        Self { columns, tasks }
    }

    /// Creates a column at `position`, or last when `None`.
    pub fn create_column(
        &self,
        mut draft: ColumnDraft,
        position: Option<u32>,
    ) -> BoardServiceResult<BoardColumn> {
        draft.name =
            normalize_name(&draft.name).ok_or(BoardServiceError::InvalidName(EntityKind::Column))?;
        let column = track(
            EntityKind::Column,
            "create",
            self.columns.create_column(&draft, position),
        )?;
        info!(
            "event=column_create module=service status=ok column={} project={} position={}",
            column.uuid, column.project_uuid, column.position
        );
        Ok(column)
    }

    /// Loads one column.
    pub fn get_column(&self, id: ColumnId) -> BoardServiceResult<BoardColumn> {
        track(EntityKind::Column, "get", self.columns.get_column(id))?.ok_or(
            BoardServiceError::NotFound {
                kind: EntityKind::Column,
                id,
            },
        )
    }

    /// Lists one project's columns in order.
    pub fn list_columns(&self, project_uuid: ProjectId) -> BoardServiceResult<Vec<BoardColumn>> {
        track(
            EntityKind::Column,
            "list",
            self.columns.list_columns(project_uuid),
        )
    }

    /// Renames one column. Position is untouched.
    pub fn rename_column(&self, id: ColumnId, name: &str) -> BoardServiceResult<BoardColumn> {
        let normalized =
            normalize_name(name).ok_or(BoardServiceError::InvalidName(EntityKind::Column))?;
        track(
            EntityKind::Column,
            "rename",
            self.columns.rename_column(id, &normalized),
        )
    }

    /// Moves a column to `target` within its project.
    pub fn move_column(
        &self,
        id: ColumnId,
        target: u32,
    ) -> BoardServiceResult<Reordered<BoardColumn>> {
        let changes = track(
            EntityKind::Column,
            "move",
            self.columns.move_column(id, target),
        )?;
        info!(
            "event=column_move module=service status=ok column={} target={} changed={}",
            id,
            target,
            changes.len()
        );
        Ok(Reordered {
            item: self.get_column(id)?,
            changes,
        })
    }

    /// Deletes a column with its tasks.
    pub fn delete_column(&self, id: ColumnId) -> BoardServiceResult<ChangeSet<ColumnId>> {
        let changes = track(EntityKind::Column, "delete", self.columns.delete_column(id))?;
        info!(
            "event=column_delete module=service status=ok column={} changed={}",
            id,
            changes.len()
        );
        Ok(changes)
    }

    /// Builds the board view of one project.
    ///
    /// An unknown project yields a board without lanes. A lane whose
    /// positions are not dense fails with `ScopeCorrupted`.
    pub fn board(&self, project_uuid: ProjectId) -> BoardServiceResult<Board> {
        let columns = self.list_columns(project_uuid)?;
        ensure_dense(EntityKind::Column, "board", &columns)?;
        let mut lanes = Vec::with_capacity(columns.len());
        for column in columns {
            let tasks = track(EntityKind::Task, "list", self.tasks.list_tasks(column.uuid))?;
            ensure_dense(EntityKind::Task, "board", &tasks)?;
            lanes.push(BoardLane { column, tasks });
        }
        Ok(Board {
            project_uuid,
            lanes,
        })
    }
}
