//! Ordered-table adapter between SQLite rows and the reorder engine.
//!
//! # Responsibility
//! - Load `(uuid, position)` snapshots of one scope.
//! - Persist the repositioned part of a change set.
//! - Inspect and compact whole scopes for `check`/`repair`.
//!
//! # Invariants
//! - Snapshots are ordered `position ASC, uuid ASC`.
//! - Writes must run inside the caller's `IMMEDIATE` transaction; the
//!   snapshot and the write then see the same scope state.

use super::{parse_position, parse_uuid, BoardRepoError, BoardRepoResult, EntityKind};
use crate::reorder::{self, ChangeSet, PositionSlot, ReorderError, ScopeCorruption};
use log::{debug, error, info};
use rusqlite::{params, Connection, Transaction, TransactionBehavior};
use uuid::Uuid;

/// SQLite table holding one kind of ordered record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeTable {
    pub kind: EntityKind,
    pub table: &'static str,
    /// Column whose value partitions the table into scopes.
    pub scope_column: &'static str,
}

/// Projects ordered per owner.
pub const PROJECT_SCOPE: ScopeTable = ScopeTable {
    kind: EntityKind::Project,
    table: "projects",
    scope_column: "owner_id",
};

/// Columns ordered per project.
pub const COLUMN_SCOPE: ScopeTable = ScopeTable {
    kind: EntityKind::Column,
    table: "board_columns",
    scope_column: "project_uuid",
};

/// Tasks ordered per column.
pub const TASK_SCOPE: ScopeTable = ScopeTable {
    kind: EntityKind::Task,
    table: "tasks",
    scope_column: "column_uuid",
};

/// Every ordered table, in parent-to-child order.
pub const ALL_SCOPES: [ScopeTable; 3] = [PROJECT_SCOPE, COLUMN_SCOPE, TASK_SCOPE];

/// Result of validating one scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeHealth {
    pub kind: EntityKind,
    pub scope: Uuid,
    pub len: usize,
    pub corruption: Option<ScopeCorruption<Uuid>>,
}

impl ScopeHealth {
    pub fn is_healthy(&self) -> bool {
        self.corruption.is_none()
    }
}

impl ScopeTable {
    /// Loads the `(uuid, position)` snapshot of one scope.
    pub fn load(&self, conn: &Connection, scope: Uuid) -> BoardRepoResult<Vec<PositionSlot<Uuid>>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT uuid, position
             FROM {table}
             WHERE {scope_column} = ?1
             ORDER BY position ASC, uuid ASC;",
            table = self.table,
            scope_column = self.scope_column,
        ))?;
        let mut rows = stmt.query([scope.to_string()])?;
        let mut slots = Vec::new();
        while let Some(row) = rows.next()? {
            let uuid_text: String = row.get(0)?;
            let position: i64 = row.get(1)?;
            slots.push(PositionSlot::new(
                parse_uuid(&uuid_text, "uuid")?,
                parse_position(position, "position")?,
            ));
        }
        Ok(slots)
    }

    /// Returns the scope key of one record, or `None` when it does not exist.
    pub fn scope_of(&self, conn: &Connection, id: Uuid) -> BoardRepoResult<Option<Uuid>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {scope_column} FROM {table} WHERE uuid = ?1;",
            table = self.table,
            scope_column = self.scope_column,
        ))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => {
                let value: String = row.get(0)?;
                Ok(Some(parse_uuid(&value, "scope key")?))
            }
            None => Ok(None),
        }
    }

    /// Like [`ScopeTable::scope_of`], but a missing record is `NotFound`.
    pub fn require_scope_of(&self, conn: &Connection, id: Uuid) -> BoardRepoResult<Uuid> {
        self.scope_of(conn, id)?.ok_or(BoardRepoError::NotFound {
            kind: self.kind,
            id,
        })
    }

    /// Persists new positions of items that stay in scope.
    ///
    /// Inserted and removed entries are left to the owning repository since
    /// they need the full row.
    pub fn write(&self, conn: &Connection, changes: &ChangeSet<Uuid>) -> BoardRepoResult<usize> {
        let mut stmt = conn.prepare(&format!(
            "UPDATE {table}
             SET position = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            table = self.table,
        ))?;
        let mut written = 0;
        for (id, position) in changes.repositioned() {
            written += stmt.execute(params![id.to_string(), position])?;
        }
        debug!(
            "event=scope_write module=repo table={} changed={}",
            self.table, written
        );
        Ok(written)
    }

    /// Lists every distinct scope key present in the table.
    pub fn list_scopes(&self, conn: &Connection) -> BoardRepoResult<Vec<Uuid>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT DISTINCT {scope_column} FROM {table} ORDER BY {scope_column} ASC;",
            table = self.table,
            scope_column = self.scope_column,
        ))?;
        let mut rows = stmt.query([])?;
        let mut scopes = Vec::new();
        while let Some(row) = rows.next()? {
            let value: String = row.get(0)?;
            scopes.push(parse_uuid(&value, "scope key")?);
        }
        Ok(scopes)
    }

    /// Validates one scope without modifying it.
    pub fn inspect(&self, conn: &Connection, scope: Uuid) -> BoardRepoResult<ScopeHealth> {
        let slots = self.load(conn, scope)?;
        let corruption = match reorder::validate_scope(&slots) {
            Ok(()) => None,
            Err(ReorderError::ScopeCorrupted(corruption)) => Some(corruption),
            Err(other) => return Err(other.into()),
        };
        if let Some(corruption) = &corruption {
            error!(
                "event=scope_corrupted module=repo table={} scope={} detail={}",
                self.table, scope, corruption
            );
        }
        Ok(ScopeHealth {
            kind: self.kind,
            scope,
            len: slots.len(),
            corruption,
        })
    }

    /// Validates every scope of the table.
    pub fn inspect_all(&self, conn: &Connection) -> BoardRepoResult<Vec<ScopeHealth>> {
        self.list_scopes(conn)?
            .into_iter()
            .map(|scope| self.inspect(conn, scope))
            .collect()
    }

    /// Renumbers one scope to `1..=N`, keeping `(position, uuid)` order.
    ///
    /// Runs in its own `IMMEDIATE` transaction.
    pub fn compact(&self, conn: &Connection, scope: Uuid) -> BoardRepoResult<ChangeSet<Uuid>> {
        let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
        let slots = self.load(&tx, scope)?;
        let changes = reorder::compact(&slots)?;
        self.write(&tx, &changes)?;
        tx.commit()?;
        info!(
            "event=scope_compact module=repo status=ok table={} scope={} changed={}",
            self.table,
            scope,
            changes.len()
        );
        Ok(changes)
    }
}

#[cfg(test)]
mod tests {
    use super::{ALL_SCOPES, COLUMN_SCOPE, PROJECT_SCOPE, TASK_SCOPE};
    use crate::db::open_db_in_memory;
    use crate::reorder::ScopeCorruption;
    use rusqlite::params;
    use uuid::Uuid;

    fn seed_projects(conn: &rusqlite::Connection, owner: Uuid, positions: &[u32]) -> Vec<Uuid> {
        positions
            .iter()
            .map(|position| {
                let id = Uuid::new_v4();
                conn.execute(
                    "INSERT INTO projects (uuid, owner_id, name, position) VALUES (?1, ?2, 'p', ?3);",
                    params![id.to_string(), owner.to_string(), position],
                )
                .unwrap();
                id
            })
            .collect()
    }

    #[test]
    fn load_orders_by_position() {
        let conn = open_db_in_memory().unwrap();
        let owner = Uuid::new_v4();
        let ids = seed_projects(&conn, owner, &[2, 3, 1]);

        let slots = PROJECT_SCOPE.load(&conn, owner).unwrap();
        let order: Vec<Uuid> = slots.iter().map(|slot| slot.id).collect();
        assert_eq!(order, vec![ids[2], ids[0], ids[1]]);
    }

    #[test]
    fn inspect_reports_gap_and_compact_repairs_it() {
        let conn = open_db_in_memory().unwrap();
        let owner = Uuid::new_v4();
        seed_projects(&conn, owner, &[1, 2, 5]);

        let health = PROJECT_SCOPE.inspect(&conn, owner).unwrap();
        assert!(matches!(
            health.corruption,
            Some(ScopeCorruption::PositionOutOfRange { position: 5, .. })
        ));

        let changes = PROJECT_SCOPE.compact(&conn, owner).unwrap();
        assert_eq!(changes.len(), 1);
        assert!(PROJECT_SCOPE.inspect(&conn, owner).unwrap().is_healthy());
    }

    #[test]
    fn scope_of_unknown_record_is_none() {
        let conn = open_db_in_memory().unwrap();
        for table in ALL_SCOPES {
            assert_eq!(table.scope_of(&conn, Uuid::new_v4()).unwrap(), None);
        }
        assert!(COLUMN_SCOPE.require_scope_of(&conn, Uuid::new_v4()).is_err());
        assert!(TASK_SCOPE.list_scopes(&conn).unwrap().is_empty());
    }
}
