//! Project repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist projects and keep each owner's project order dense.
//!
//! # Invariants
//! - Listing is deterministic: `position ASC, uuid ASC`.
//! - Deleting a project cascades to its columns and tasks.

use super::scope::PROJECT_SCOPE;
use super::{ensure_connection_ready, parse_position, parse_uuid};
use super::{BoardRepoError, BoardRepoResult, EntityKind};
use crate::model::project::{Project, ProjectDraft, ProjectPatch, ProjectStatus};
use crate::model::{OwnerId, ProjectId};
use crate::reorder::{self, ChangeSet};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const PROJECT_COLUMNS: &str = "uuid, owner_id, name, description, status, position, created_at, updated_at";

/// Repository interface for project persistence.
pub trait ProjectRepository {
    /// Creates a project at `position`, or appends it when `None`.
    fn create_project(
        &self,
        draft: &ProjectDraft,
        position: Option<u32>,
    ) -> BoardRepoResult<Project>;
    /// Loads one project by id.
    fn get_project(&self, id: ProjectId) -> BoardRepoResult<Option<Project>>;
    /// Lists one owner's projects in order.
    fn list_projects(&self, owner_id: OwnerId) -> BoardRepoResult<Vec<Project>>;
    /// Updates non-positional fields.
    fn update_project(&self, id: ProjectId, patch: &ProjectPatch) -> BoardRepoResult<Project>;
    /// Moves a project inside its owner's order.
    fn move_project(&self, id: ProjectId, target: u32) -> BoardRepoResult<ChangeSet<ProjectId>>;
    /// Deletes a project and closes the gap it leaves.
    fn delete_project(&self, id: ProjectId) -> BoardRepoResult<ChangeSet<ProjectId>>;
}

/// SQLite-backed project repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> BoardRepoResult<Self> {
        ensure_connection_ready(
            conn,
            "projects",
            &[
                "uuid",
                "owner_id",
                "name",
                "description",
                "status",
                "position",
                "created_at",
                "updated_at",
            ],
        )?;
        Ok(Self { conn })
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project(
        &self,
        draft: &ProjectDraft,
        position: Option<u32>,
    ) -> BoardRepoResult<Project> {
        let id = Uuid::new_v4();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let slots = PROJECT_SCOPE.load(&tx, draft.owner_id)?;
        let changes = reorder::insert_at(&slots, id, position)?;
        let (_, assigned) = changes.inserted().ok_or_else(|| {
            BoardRepoError::InvalidData("insert produced no position".to_string())
        })?;

        PROJECT_SCOPE.write(&tx, &changes)?;
        tx.execute(
            "INSERT INTO projects (uuid, owner_id, name, description, status, position)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                id.to_string(),
                draft.owner_id.to_string(),
                draft.name,
                draft.description,
                draft.status.as_str(),
                assigned,
            ],
        )?;
        let project = load_required_project(&tx, id)?;
        tx.commit()?;
        Ok(project)
    }

    fn get_project(&self, id: ProjectId) -> BoardRepoResult<Option<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_project_row(row)?));
        }
        Ok(None)
    }

    fn list_projects(&self, owner_id: OwnerId) -> BoardRepoResult<Vec<Project>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PROJECT_COLUMNS}
             FROM projects
             WHERE owner_id = ?1
             ORDER BY position ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([owner_id.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_project_row(row)?);
        }
        Ok(items)
    }

    fn update_project(&self, id: ProjectId, patch: &ProjectPatch) -> BoardRepoResult<Project> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let current = load_required_project(&tx, id)?;
        let name = patch.name.as_deref().unwrap_or(&current.name);
        let description = match &patch.description {
            Some(value) => value.as_deref(),
            None => current.description.as_deref(),
        };
        let status = patch.status.unwrap_or(current.status);
        tx.execute(
            "UPDATE projects
             SET name = ?2,
                 description = ?3,
                 status = ?4,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), name, description, status.as_str()],
        )?;
        let project = load_required_project(&tx, id)?;
        tx.commit()?;
        Ok(project)
    }

    fn move_project(&self, id: ProjectId, target: u32) -> BoardRepoResult<ChangeSet<ProjectId>> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let owner_id = PROJECT_SCOPE.require_scope_of(&tx, id)?;
        let slots = PROJECT_SCOPE.load(&tx, owner_id)?;
        let changes = reorder::move_to(&slots, id, target)?;
        PROJECT_SCOPE.write(&tx, &changes)?;
        tx.commit()?;
        Ok(changes)
    }

    fn delete_project(&self, id: ProjectId) -> BoardRepoResult<ChangeSet<ProjectId>> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let owner_id = PROJECT_SCOPE.require_scope_of(&tx, id)?;
        let slots = PROJECT_SCOPE.load(&tx, owner_id)?;
        let changes = reorder::delete(&slots, id)?;
        tx.execute("DELETE FROM projects WHERE uuid = ?1;", [id.to_string()])?;
        PROJECT_SCOPE.write(&tx, &changes)?;
        tx.commit()?;
        Ok(changes)
    }
}

fn load_required_project(conn: &Connection, id: ProjectId) -> BoardRepoResult<Project> {
    let mut stmt = conn.prepare(&format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE uuid = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return parse_project_row(row);
    }
    Err(BoardRepoError::NotFound {
        kind: EntityKind::Project,
        id,
    })
}

fn parse_project_row(row: &Row<'_>) -> BoardRepoResult<Project> {
    let uuid_text: String = row.get("uuid")?;
    let owner_text: String = row.get("owner_id")?;
    let status_text: String = row.get("status")?;
    let status = ProjectStatus::parse(&status_text).ok_or_else(|| {
        BoardRepoError::InvalidData(format!("invalid project status `{status_text}`"))
    })?;

    Ok(Project {
        uuid: parse_uuid(&uuid_text, "projects.uuid")?,
        owner_id: parse_uuid(&owner_text, "projects.owner_id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        status,
        position: parse_position(row.get("position")?, "projects.position")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
