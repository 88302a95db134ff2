//! Core domain logic for the task board.
//! This crate is the single source of truth for ordering invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod reorder;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::column::{BoardColumn, ColumnDraft};
pub use model::project::{Project, ProjectDraft, ProjectPatch, ProjectStatus, DEFAULT_PROJECT_NAME};
pub use model::task::{Task, TaskDraft, TaskPatch, TaskStatus};
pub use model::{ColumnId, OwnerId, ProjectId, TaskId, UserId};
pub use reorder::{
    ChangeSet, PositionChange, PositionSlot, Positioned, ReorderError, ReorderResult,
    ScopeCorruption,
};
pub use repo::column_repo::{ColumnRepository, SqliteColumnRepository};
pub use repo::project_repo::{ProjectRepository, SqliteProjectRepository};
pub use repo::scope::{ScopeHealth, ScopeTable, ALL_SCOPES, COLUMN_SCOPE, PROJECT_SCOPE, TASK_SCOPE};
pub use repo::task_repo::{Relocation, SqliteTaskRepository, TaskRepository};
pub use repo::{BoardRepoError, BoardRepoResult, EntityKind};
pub use service::column_service::{Board, BoardLane, ColumnService};
pub use service::project_service::ProjectService;
pub use service::task_service::TaskService;
pub use service::{BoardServiceError, BoardServiceResult, Reordered};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
