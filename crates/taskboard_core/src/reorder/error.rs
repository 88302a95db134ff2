//! Reorder engine error taxonomy.
//!
//! # Invariants
//! - Every error is raised before any change is computed; callers never see a
//!   partially shifted result.
//! - `ScopeCorrupted` is the only server-side fault; the rest are caller input
//!   errors.

use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// Result type used by reorder engine operations.
pub type ReorderResult<T, I> = Result<T, ReorderError<I>>;

/// Errors from reorder engine operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReorderError<I> {
    /// Requested position falls outside `1..=max` for the operation.
    InvalidPosition { requested: u32, max: u32 },
    /// Referenced item is absent from the supplied scope snapshot.
    ItemNotFound(I),
    /// Item to insert is already part of the scope snapshot.
    ItemAlreadyInScope(I),
    /// Supplied snapshot violates the dense `1..=N` ordering.
    ScopeCorrupted(ScopeCorruption<I>),
}

impl<I> ReorderError<I> {
    /// Returns `true` when the error was caused by caller input.
    ///
    /// Corruption predates the call and must be investigated, not retried.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::ScopeCorrupted(_))
    }
}

impl<I: Display> Display for ReorderError<I> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPosition { requested, max } => {
                write!(f, "position {requested} is outside the valid range 1..={max}")
            }
            Self::ItemNotFound(id) => write!(f, "item not found in scope: {id}"),
            Self::ItemAlreadyInScope(id) => write!(f, "item already in scope: {id}"),
            Self::ScopeCorrupted(corruption) => write!(f, "scope corrupted: {corruption}"),
        }
    }
}

impl<I: Debug + Display> Error for ReorderError<I> {}

/// Concrete invariant violation found in a scope snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeCorruption<I> {
    /// Two items share one position.
    DuplicatePosition { position: u32, first: I, second: I },
    /// One item id appears twice.
    DuplicateItem(I),
    /// Position is zero or larger than the scope size (a gap exists).
    PositionOutOfRange { id: I, position: u32, len: usize },
}

impl<I: Display> Display for ScopeCorruption<I> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicatePosition {
                position,
                first,
                second,
            } => write!(f, "items {first} and {second} both hold position {position}"),
            Self::DuplicateItem(id) => write!(f, "item {id} appears more than once"),
            Self::PositionOutOfRange { id, position, len } => write!(
                f,
                "item {id} holds position {position} outside 1..={len}"
            ),
        }
    }
}
