//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Normalize user input and classify failures as caller vs server faults.
//!
//! # Invariants
//! - Scope corruption is logged at `error` level with metadata only.

pub mod column_service;
pub mod project_service;
pub mod task_service;

use crate::reorder::{self, ChangeSet, Positioned, ReorderError, ScopeCorruption};
use crate::repo::{BoardRepoError, BoardRepoResult, EntityKind};
use log::error;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Result type used by board services.
pub type BoardServiceResult<T> = Result<T, BoardServiceError>;

/// Record after a position-changing operation, with every shifted item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reordered<T> {
    pub item: T,
    pub changes: ChangeSet<Uuid>,
}

/// Errors from board service operations.
#[derive(Debug)]
pub enum BoardServiceError {
    /// Name or title is blank after trim.
    InvalidName(EntityKind),
    /// Referenced record does not exist.
    NotFound { kind: EntityKind, id: Uuid },
    /// Requested position falls outside the valid range.
    InvalidPosition { requested: u32, max: u32 },
    /// Task relocation crosses a project boundary.
    CrossProjectMove {
        task: Uuid,
        from_project: Uuid,
        to_project: Uuid,
    },
    /// Stored positions of one scope are not `1..=N`.
    ScopeCorrupted(ScopeCorruption<Uuid>),
    /// Repository-level failure.
    Repo(BoardRepoError),
}

impl BoardServiceError {
    /// Returns `true` when the error was caused by caller input and must not
    /// be reported as a server fault.
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::InvalidName(_)
            | Self::NotFound { .. }
            | Self::InvalidPosition { .. }
            | Self::CrossProjectMove { .. } => true,
            Self::ScopeCorrupted(_) => false,
            Self::Repo(err) => err.is_client_error(),
        }
    }
}

impl Display for BoardServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(kind) => write!(f, "{kind} name must not be blank"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::InvalidPosition { requested, max } => {
                write!(f, "position {requested} is outside the valid range 1..={max}")
            }
            Self::CrossProjectMove {
                task,
                from_project,
                to_project,
            } => write!(
                f,
                "task {task} cannot move from project {from_project} to project {to_project}"
            ),
            Self::ScopeCorrupted(corruption) => write!(f, "scope corrupted: {corruption}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BoardServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BoardRepoError> for BoardServiceError {
    fn from(value: BoardRepoError) -> Self {
        match value {
            BoardRepoError::NotFound { kind, id } => Self::NotFound { kind, id },
            BoardRepoError::CrossProjectMove {
                task,
                from_project,
                to_project,
            } => Self::CrossProjectMove {
                task,
                from_project,
                to_project,
            },
            BoardRepoError::Reorder(ReorderError::InvalidPosition { requested, max }) => {
                Self::InvalidPosition { requested, max }
            }
            BoardRepoError::Reorder(ReorderError::ScopeCorrupted(corruption)) => {
                Self::ScopeCorrupted(corruption)
            }
            other => Self::Repo(other),
        }
    }
}

/// Maps a repository result and reports corrupted scopes.
fn track<T>(
    kind: EntityKind,
    operation: &'static str,
    result: BoardRepoResult<T>,
) -> BoardServiceResult<T> {
    result.map_err(|err| {
        let err = BoardServiceError::from(err);
        if let BoardServiceError::ScopeCorrupted(corruption) = &err {
            error!(
                "event=scope_corrupted module=service status=error kind={} op={} detail={}",
                kind, operation, corruption
            );
        }
        err
    })
}

/// Fails with `ScopeCorrupted` when a listed scope is not dense.
fn ensure_dense<T: Positioned<Id = Uuid>>(
    kind: EntityKind,
    operation: &'static str,
    items: &[T],
) -> BoardServiceResult<()> {
    track(
        kind,
        operation,
        reorder::validate_scope(items).map_err(BoardRepoError::from),
    )
}

/// Trims a user-supplied name; `None` when nothing is left.
fn normalize_name(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
