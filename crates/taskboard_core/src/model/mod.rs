//! Board domain model: owner-scoped projects, project-scoped columns and
//! column-scoped tasks.
//!
//! # Responsibility
//! - Define the records persisted by the repository layer.
//! - Expose each record to the reorder engine through `Positioned`.
//!
//! # Invariants
//! - Ids and scope keys never change after creation.
//! - `position` is 1-based and dense within its scope.

pub mod column;
pub mod project;
pub mod task;

use uuid::Uuid;

/// Identity of the user owning a set of projects (project scope key).
pub type OwnerId = Uuid;
/// Stable project identifier (column scope key).
pub type ProjectId = Uuid;
/// Stable column identifier (task scope key).
pub type ColumnId = Uuid;
/// Stable task identifier.
pub type TaskId = Uuid;
/// Identity of the user a task is assigned to.
pub type UserId = Uuid;
