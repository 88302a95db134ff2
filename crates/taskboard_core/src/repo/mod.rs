//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define board data access contracts (projects, columns, tasks).
//! - Run every ordered mutation as "load snapshot, compute, persist diff"
//!   inside one `IMMEDIATE` transaction.
//!
//! # Invariants
//! - A failed operation leaves the database unchanged.
//! - Repository APIs return semantic errors (`NotFound`, `Reorder`) in
//!   addition to DB transport errors.
//!
//! # See also
//! - `crate::reorder` for the position arithmetic.

pub mod column_repo;
pub mod project_repo;
pub mod scope;
pub mod task_repo;

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::reorder::ReorderError;
use rusqlite::Connection;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Result type used by board repository operations.
pub type BoardRepoResult<T> = Result<T, BoardRepoError>;

/// Kind of ordered board record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Project,
    Column,
    Task,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Column => "column",
            Self::Task => "task",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from board repository operations.
#[derive(Debug)]
pub enum BoardRepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Referenced record does not exist.
    NotFound { kind: EntityKind, id: Uuid },
    /// Reorder engine rejected the operation or found a corrupted scope.
    Reorder(ReorderError<Uuid>),
    /// Task relocation crosses a project boundary.
    CrossProjectMove {
        task: Uuid,
        from_project: Uuid,
        to_project: Uuid,
    },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to valid read model.
    InvalidData(String),
}

impl BoardRepoError {
    /// Returns `true` when the error was caused by caller input.
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::NotFound { .. } | Self::CrossProjectMove { .. } => true,
            Self::Reorder(err) => err.is_client_error(),
            Self::Db(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. }
            | Self::InvalidData(_) => false,
        }
    }
}

impl Display for BoardRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::Reorder(err) => write!(f, "{err}"),
            Self::CrossProjectMove {
                task,
                from_project,
                to_project,
            } => write!(
                f,
                "task {task} cannot move from project {from_project} to project {to_project}"
            ),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "board repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "board repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "board repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid board data: {message}"),
        }
    }
}

impl Error for BoardRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Reorder(err) => Some(err),
            Self::NotFound { .. }
            | Self::CrossProjectMove { .. }
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. }
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for BoardRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for BoardRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<ReorderError<Uuid>> for BoardRepoError {
    fn from(value: ReorderError<Uuid>) -> Self {
        Self::Reorder(value)
    }
}

pub(crate) fn parse_uuid(value: &str, column: &'static str) -> BoardRepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| BoardRepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

pub(crate) fn parse_position(value: i64, column: &'static str) -> BoardRepoResult<u32> {
    u32::try_from(value)
        .map_err(|_| BoardRepoError::InvalidData(format!("invalid position `{value}` in {column}")))
}

/// Verifies schema version plus the table and columns one repository needs.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    table: &'static str,
    columns: &[&'static str],
) -> BoardRepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(BoardRepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, table)? {
        return Err(BoardRepoError::MissingRequiredTable(table));
    }

    for &column in columns {
        if !table_has_column(conn, table, column)? {
            return Err(BoardRepoError::MissingRequiredColumn { table, column });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> BoardRepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> BoardRepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
