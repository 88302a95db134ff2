//! Board column repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Columns are ordered per project: `position ASC, uuid ASC`.
//! - Deleting a column cascades to its tasks.

use super::scope::{COLUMN_SCOPE, PROJECT_SCOPE};
use super::{ensure_connection_ready, parse_position, parse_uuid};
use super::{BoardRepoError, BoardRepoResult, EntityKind};
use crate::model::column::{BoardColumn, ColumnDraft};
use crate::model::{ColumnId, ProjectId};
use crate::reorder::{self, ChangeSet};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const COLUMN_COLUMNS: &str = "uuid, project_uuid, name, position, created_at, updated_at";

/// Repository interface for board column persistence.
pub trait ColumnRepository {
    /// Creates a column at `position`, or appends it when `None`.
    fn create_column(
        &self,
        draft: &ColumnDraft,
        position: Option<u32>,
    ) -> BoardRepoResult<BoardColumn>;
    /// Loads one column by id.
    fn get_column(&self, id: ColumnId) -> BoardRepoResult<Option<BoardColumn>>;
    /// Lists one project's columns in order.
    fn list_columns(&self, project_uuid: ProjectId) -> BoardRepoResult<Vec<BoardColumn>>;
    /// Renames one column.
    fn rename_column(&self, id: ColumnId, name: &str) -> BoardRepoResult<BoardColumn>;
    /// Moves a column inside its project.
    fn move_column(&self, id: ColumnId, target: u32) -> BoardRepoResult<ChangeSet<ColumnId>>;
    /// Deletes a column with its tasks and closes the gap it leaves.
    fn delete_column(&self, id: ColumnId) -> BoardRepoResult<ChangeSet<ColumnId>>;
}

/// SQLite-backed board column repository.
pub struct SqliteColumnRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteColumnRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> BoardRepoResult<Self> {
        ensure_connection_ready(
            conn,
            "board_columns",
            &[
                "uuid",
                "project_uuid",
                "name",
                "position",
                "created_at",
                "updated_at",
            ],
        )?;
        Ok(Self { conn })
    }
}

impl ColumnRepository for SqliteColumnRepository<'_> {
    fn create_column(
        &self,
        draft: &ColumnDraft,
        position: Option<u32>,
    ) -> BoardRepoResult<BoardColumn> {
        let id = Uuid::new_v4();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        PROJECT_SCOPE.require_scope_of(&tx, draft.project_uuid)?;
        let slots = COLUMN_SCOPE.load(&tx, draft.project_uuid)?;
        let changes = reorder::insert_at(&slots, id, position)?;
        let (_, assigned) = changes.inserted().ok_or_else(|| {
            BoardRepoError::InvalidData("insert produced no position".to_string())
        })?;

        COLUMN_SCOPE.write(&tx, &changes)?;
        tx.execute(
            "INSERT INTO board_columns (uuid, project_uuid, name, position)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                id.to_string(),
                draft.project_uuid.to_string(),
                draft.name,
                assigned
            ],
        )?;
        let column = load_required_column(&tx, id)?;
        tx.commit()?;
        Ok(column)
    }

    fn get_column(&self, id: ColumnId) -> BoardRepoResult<Option<BoardColumn>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COLUMN_COLUMNS} FROM board_columns WHERE uuid = ?1;"
        ))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_column_row(row)?));
        }
        Ok(None)
    }

    fn list_columns(&self, project_uuid: ProjectId) -> BoardRepoResult<Vec<BoardColumn>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COLUMN_COLUMNS}
             FROM board_columns
             WHERE project_uuid = ?1
             ORDER BY position ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([project_uuid.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_column_row(row)?);
        }
        Ok(items)
    }

    fn rename_column(&self, id: ColumnId, name: &str) -> BoardRepoResult<BoardColumn> {
        let changed = self.conn.execute(
            "UPDATE board_columns
             SET name = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), name],
        )?;
        if changed == 0 {
            return Err(BoardRepoError::NotFound {
                kind: EntityKind::Column,
                id,
            });
        }
        load_required_column(self.conn, id)
    }

    fn move_column(&self, id: ColumnId, target: u32) -> BoardRepoResult<ChangeSet<ColumnId>> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let project_uuid = COLUMN_SCOPE.require_scope_of(&tx, id)?;
        let slots = COLUMN_SCOPE.load(&tx, project_uuid)?;
        let changes = reorder::move_to(&slots, id, target)?;
        COLUMN_SCOPE.write(&tx, &changes)?;
        tx.commit()?;
        Ok(changes)
    }

    fn delete_column(&self, id: ColumnId) -> BoardRepoResult<ChangeSet<ColumnId>> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let project_uuid = COLUMN_SCOPE.require_scope_of(&tx, id)?;
        let slots = COLUMN_SCOPE.load(&tx, project_uuid)?;
        let changes = reorder::delete(&slots, id)?;
        tx.execute("DELETE FROM board_columns WHERE uuid = ?1;", [id.to_string()])?;
        COLUMN_SCOPE.write(&tx, &changes)?;
        tx.commit()?;
        Ok(changes)
    }
}

fn load_required_column(conn: &Connection, id: ColumnId) -> BoardRepoResult<BoardColumn> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMN_COLUMNS} FROM board_columns WHERE uuid = ?1;"
    ))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return parse_column_row(row);
    }
    Err(BoardRepoError::NotFound {
        kind: EntityKind::Column,
        id,
    })
}

fn parse_column_row(row: &Row<'_>) -> BoardRepoResult<BoardColumn> {
    let uuid_text: String = row.get("uuid")?;
    let project_text: String = row.get("project_uuid")?;
    Ok(BoardColumn {
        uuid: parse_uuid(&uuid_text, "board_columns.uuid")?,
        project_uuid: parse_uuid(&project_text, "board_columns.project_uuid")?,
        name: row.get("name")?,
        position: parse_position(row.get("position")?, "board_columns.position")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
