//! Task repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist tasks and keep each column's task order dense.
//! - Relocate tasks between columns of one project.
//! - Track task assignees and list one assignee's tasks.
//!
//! # Invariants
//! - Tasks are ordered per column: `position ASC, uuid ASC`.
//! - `tasks.project_uuid` always equals the owning column's project.
//! - Relocation is one transaction: the source scope loses the task and the
//!   target scope gains it, or nothing changes.

use super::scope::{COLUMN_SCOPE, TASK_SCOPE};
use super::{ensure_connection_ready, parse_position, parse_uuid};
use super::{BoardRepoError, BoardRepoResult, EntityKind};
use crate::model::task::{Task, TaskDraft, TaskPatch, TaskStatus};
use crate::model::{ColumnId, TaskId, UserId};
use crate::reorder::{self, ChangeSet};
use log::info;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use serde::Serialize;
use uuid::Uuid;

const TASK_COLUMNS: &str = "uuid, project_uuid, column_uuid, title, description, status, priority, assignee_id, position, created_at, updated_at";

/// Position changes caused by relocating one task.
///
/// For a relocation inside the same column only `source` is populated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Relocation {
    pub source: ChangeSet<TaskId>,
    pub target: ChangeSet<TaskId>,
}

/// Repository interface for task persistence.
pub trait TaskRepository {
    /// Creates a task in `draft.column_uuid` at `position`, or appends it.
    fn create_task(&self, draft: &TaskDraft, position: Option<u32>) -> BoardRepoResult<Task>;
    /// Loads one task by id.
    fn get_task(&self, id: TaskId) -> BoardRepoResult<Option<Task>>;
    /// Lists one column's tasks in order.
    fn list_tasks(&self, column_uuid: ColumnId) -> BoardRepoResult<Vec<Task>>;
    /// Lists the tasks assigned to `assignee` across all projects.
    ///
    /// Ordered by project, then column, then position.
    fn list_tasks_for_assignee(&self, assignee: UserId) -> BoardRepoResult<Vec<Task>>;
    /// Updates non-positional fields.
    fn update_task(&self, id: TaskId, patch: &TaskPatch) -> BoardRepoResult<Task>;
    /// Moves a task inside its column.
    fn move_task(&self, id: TaskId, target: u32) -> BoardRepoResult<ChangeSet<TaskId>>;
    /// Moves a task into another column of the same project.
    ///
    /// `position = None` appends to the target column.
    fn relocate_task(
        &self,
        id: TaskId,
        target_column: ColumnId,
        position: Option<u32>,
    ) -> BoardRepoResult<Relocation>;
    /// Deletes a task and closes the gap it leaves.
    fn delete_task(&self, id: TaskId) -> BoardRepoResult<ChangeSet<TaskId>>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> BoardRepoResult<Self> {
        ensure_connection_ready(
            conn,
            "tasks",
            &[
                "uuid",
                "project_uuid",
                "column_uuid",
                "title",
                "description",
                "status",
                "priority",
                "assignee_id",
                "position",
                "created_at",
                "updated_at",
            ],
        )?;
        Ok(Self { conn })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, draft: &TaskDraft, position: Option<u32>) -> BoardRepoResult<Task> {
        let id = Uuid::new_v4();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let project_uuid = COLUMN_SCOPE.require_scope_of(&tx, draft.column_uuid)?;
        let slots = TASK_SCOPE.load(&tx, draft.column_uuid)?;
        let changes = reorder::insert_at(&slots, id, position)?;
        let (_, assigned) = changes.inserted().ok_or_else(|| {
            BoardRepoError::InvalidData("insert produced no position".to_string())
        })?;

        TASK_SCOPE.write(&tx, &changes)?;
        tx.execute(
            "INSERT INTO tasks (
                uuid,
                project_uuid,
                column_uuid,
                title,
                description,
                status,
                priority,
                assignee_id,
                position
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                id.to_string(),
                project_uuid.to_string(),
                draft.column_uuid.to_string(),
                draft.title,
                draft.description,
                draft.status.as_str(),
                draft.priority,
                draft.assignee_id.map(|user| user.to_string()),
                assigned,
            ],
        )?;
        let task = load_required_task(&tx, id)?;
        tx.commit()?;
        Ok(task)
    }

    fn get_task(&self, id: TaskId) -> BoardRepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn list_tasks(&self, column_uuid: ColumnId) -> BoardRepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS}
             FROM tasks
             WHERE column_uuid = ?1
             ORDER BY position ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([column_uuid.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_task_row(row)?);
        }
        Ok(items)
    }

    fn list_tasks_for_assignee(&self, assignee: UserId) -> BoardRepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS}
             FROM tasks
             WHERE assignee_id = ?1
             ORDER BY project_uuid ASC, column_uuid ASC, position ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([assignee.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_task_row(row)?);
        }
        Ok(items)
    }

    fn update_task(&self, id: TaskId, patch: &TaskPatch) -> BoardRepoResult<Task> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let current = load_required_task(&tx, id)?;
        let title = patch.title.as_deref().unwrap_or(&current.title);
        let description = match &patch.description {
            Some(value) => value.as_deref(),
            None => current.description.as_deref(),
        };
        let status = patch.status.unwrap_or(current.status);
        let priority = patch.priority.unwrap_or(current.priority);
        let assignee = patch.assignee_id.unwrap_or(current.assignee_id);
        tx.execute(
            "UPDATE tasks
             SET title = ?2,
                 description = ?3,
                 status = ?4,
                 priority = ?5,
                 assignee_id = ?6,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![
                id.to_string(),
                title,
                description,
                status.as_str(),
                priority,
                assignee.map(|user| user.to_string()),
            ],
        )?;
        if assignee != current.assignee_id {
            info!(
                "event=task_assign module=repo status=ok task={} assigned={}",
                id,
                assignee.is_some()
            );
        }
        let task = load_required_task(&tx, id)?;
        tx.commit()?;
        Ok(task)
    }

    fn move_task(&self, id: TaskId, target: u32) -> BoardRepoResult<ChangeSet<TaskId>> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let column_uuid = TASK_SCOPE.require_scope_of(&tx, id)?;
        let slots = TASK_SCOPE.load(&tx, column_uuid)?;
        let changes = reorder::move_to(&slots, id, target)?;
        TASK_SCOPE.write(&tx, &changes)?;
        tx.commit()?;
        Ok(changes)
    }

    fn relocate_task(
        &self,
        id: TaskId,
        target_column: ColumnId,
        position: Option<u32>,
    ) -> BoardRepoResult<Relocation> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let task = load_required_task(&tx, id)?;
        let target_project = COLUMN_SCOPE.require_scope_of(&tx, target_column)?;
        if target_project != task.project_uuid {
            return Err(BoardRepoError::CrossProjectMove {
                task: id,
                from_project: task.project_uuid,
                to_project: target_project,
            });
        }

        if target_column == task.column_uuid {
            let slots = TASK_SCOPE.load(&tx, target_column)?;
            let last = u32::try_from(slots.len()).map_err(|_| {
                BoardRepoError::InvalidData(format!(
                    "column {target_column} holds more tasks than positions"
                ))
            })?;
            let target = position.unwrap_or(last);
            let source = reorder::move_to(&slots, id, target)?;
            TASK_SCOPE.write(&tx, &source)?;
            tx.commit()?;
            return Ok(Relocation {
                source,
                target: ChangeSet::default(),
            });
        }

        let source_slots = TASK_SCOPE.load(&tx, task.column_uuid)?;
        let target_slots = TASK_SCOPE.load(&tx, target_column)?;
        let source = reorder::delete(&source_slots, id)?;
        let target = reorder::insert_at(&target_slots, id, position)?;
        let (_, assigned) = target.inserted().ok_or_else(|| {
            BoardRepoError::InvalidData("insert produced no position".to_string())
        })?;

        TASK_SCOPE.write(&tx, &source)?;
        TASK_SCOPE.write(&tx, &target)?;
        tx.execute(
            "UPDATE tasks
             SET column_uuid = ?2,
                 position = ?3,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), target_column.to_string(), assigned],
        )?;
        tx.commit()?;

        info!(
            "event=task_relocate module=repo status=ok task={} from_column={} to_column={} position={}",
            id, task.column_uuid, target_column, assigned
        );
        Ok(Relocation { source, target })
    }

    fn delete_task(&self, id: TaskId) -> BoardRepoResult<ChangeSet<TaskId>> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let column_uuid = TASK_SCOPE.require_scope_of(&tx, id)?;
        let slots = TASK_SCOPE.load(&tx, column_uuid)?;
        let changes = reorder::delete(&slots, id)?;
        tx.execute("DELETE FROM tasks WHERE uuid = ?1;", [id.to_string()])?;
        TASK_SCOPE.write(&tx, &changes)?;
        tx.commit()?;
        Ok(changes)
    }
}

fn load_required_task(conn: &Connection, id: TaskId) -> BoardRepoResult<Task> {
    let mut stmt = conn.prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE uuid = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return parse_task_row(row);
    }
    Err(BoardRepoError::NotFound {
        kind: EntityKind::Task,
        id,
    })
}

fn parse_task_row(row: &Row<'_>) -> BoardRepoResult<Task> {
    let uuid_text: String = row.get("uuid")?;
    let project_text: String = row.get("project_uuid")?;
    let column_text: String = row.get("column_uuid")?;
    let status_text: String = row.get("status")?;
    let assignee_text: Option<String> = row.get("assignee_id")?;
    let status = TaskStatus::parse(&status_text).ok_or_else(|| {
        BoardRepoError::InvalidData(format!("invalid task status `{status_text}`"))
    })?;

    Ok(Task {
        uuid: parse_uuid(&uuid_text, "tasks.uuid")?,
        project_uuid: parse_uuid(&project_text, "tasks.project_uuid")?,
        column_uuid: parse_uuid(&column_text, "tasks.column_uuid")?,
        title: row.get("title")?,
        description: row.get("description")?,
        status,
        priority: row.get("priority")?,
        assignee_id: assignee_text
            .as_deref()
            .map(|value| parse_uuid(value, "tasks.assignee_id"))
            .transpose()?,
        position: parse_position(row.get("position")?, "tasks.position")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
