//! Ordered-collection reindexing engine.
//!
//! # Responsibility
//! - Compute position changes for insert, delete and move inside one scope.
//! - Reject corrupted scope snapshots before any change is computed.
//!
//! # Invariants
//! - Input and output scopes hold positions exactly `1..=N`.
//! - Operations are pure functions of (snapshot, parameters); no I/O.
//! - Returned change sets contain only items whose position changed.
//!
//! # See also
//! - `repo::scope` for the SQLite adapter that persists change sets.

mod error;

pub use error::{ReorderError, ReorderResult, ScopeCorruption};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Item that occupies one position inside a scope.
pub trait Positioned {
    /// Stable item identity within the scope.
    type Id: Copy + Eq + Hash + Ord + Debug + Display;

    /// Returns the item id.
    fn item_id(&self) -> Self::Id;

    /// Returns the current 1-based position.
    fn position(&self) -> u32;
}

/// Minimal snapshot row: item id plus position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositionSlot<I> {
    pub id: I,
    pub position: u32,
}

impl<I> PositionSlot<I> {
    pub fn new(id: I, position: u32) -> Self {
        Self { id, position }
    }
}

impl<I> Positioned for PositionSlot<I>
where
    I: Copy + Eq + Hash + Ord + Debug + Display,
{
    type Id = I;

    fn item_id(&self) -> I {
        self.id
    }

    fn position(&self) -> u32 {
        self.position
    }
}

/// One entry of a change set.
///
/// `from = None` marks the inserted item, `to = None` the removed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionChange<I> {
    pub id: I,
    pub from: Option<u32>,
    pub to: Option<u32>,
}

impl<I> PositionChange<I> {
    fn inserted(id: I, to: u32) -> Self {
        Self {
            id,
            from: None,
            to: Some(to),
        }
    }

    fn removed(id: I, from: u32) -> Self {
        Self {
            id,
            from: Some(from),
            to: None,
        }
    }

    fn shifted(id: I, from: u32, to: u32) -> Self {
        Self {
            id,
            from: Some(from),
            to: Some(to),
        }
    }
}

/// Items whose position changed as a result of one engine operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeSet<I> {
    changes: Vec<PositionChange<I>>,
}

impl<I> Default for ChangeSet<I> {
    fn default() -> Self {
        Self {
            changes: Vec::new(),
        }
    }
}

impl<I: Copy + Eq> ChangeSet<I> {
    fn from_changes(changes: Vec<PositionChange<I>>) -> Self {
        Self { changes }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PositionChange<I>> {
        self.changes.iter()
    }

    /// Existing items that stay in scope under a new position.
    pub fn repositioned(&self) -> impl Iterator<Item = (I, u32)> + '_ {
        self.changes
            .iter()
            .filter_map(|change| match (change.from, change.to) {
                (Some(_), Some(to)) => Some((change.id, to)),
                _ => None,
            })
    }

    /// Inserted item and its assigned position, if any.
    pub fn inserted(&self) -> Option<(I, u32)> {
        self.changes
            .iter()
            .find_map(|change| match (change.from, change.to) {
                (None, Some(to)) => Some((change.id, to)),
                _ => None,
            })
    }

    /// Removed item and the position it held, if any.
    pub fn removed(&self) -> Option<(I, u32)> {
        self.changes
            .iter()
            .find_map(|change| match (change.from, change.to) {
                (Some(from), None) => Some((change.id, from)),
                _ => None,
            })
    }

    /// Applies this change set to a slot snapshot.
    ///
    /// The snapshot is left sorted by position.
    pub fn apply_to(&self, slots: &mut Vec<PositionSlot<I>>) {
        for change in &self.changes {
            match (change.from, change.to) {
                (None, Some(to)) => slots.push(PositionSlot::new(change.id, to)),
                (Some(_), None) => slots.retain(|slot| slot.id != change.id),
                (Some(_), Some(to)) => {
                    if let Some(slot) = slots.iter_mut().find(|slot| slot.id == change.id) {
                        slot.position = to;
                    }
                }
                (None, None) => {}
            }
        }
        slots.sort_by_key(|slot| slot.position);
    }
}

/// Applies `changes` to a slot snapshot; see [`ChangeSet::apply_to`].
pub fn apply<I: Copy + Eq>(slots: &mut Vec<PositionSlot<I>>, changes: &ChangeSet<I>) {
    changes.apply_to(slots);
}

/// Checks that a scope snapshot holds positions exactly `1..=N`.
///
/// # Errors
/// - `ScopeCorrupted` for duplicate ids, duplicate positions, zero positions
///   or positions beyond the scope size.
pub fn validate_scope<T: Positioned>(items: &[T]) -> ReorderResult<(), T::Id> {
    order_by_position(items).map(|_| ())
}

/// Inserts `new_id` at `requested`, or appends when no position is given.
///
/// Every existing item at or after the target position shifts right by one.
///
/// # Errors
/// - `InvalidPosition` when `requested` is outside `1..=N+1`.
/// - `ItemAlreadyInScope` when `new_id` is already part of the snapshot.
/// - `ScopeCorrupted` when the snapshot is invalid.
pub fn insert_at<T: Positioned>(
    items: &[T],
    new_id: T::Id,
    requested: Option<u32>,
) -> ReorderResult<ChangeSet<T::Id>, T::Id> {
    let ordered = order_by_position(items)?;
    if ordered.iter().any(|item| item.item_id() == new_id) {
        return Err(ReorderError::ItemAlreadyInScope(new_id));
    }

    let len = scope_len(ordered.len());
    let max = len
        .checked_add(1)
        .ok_or(ReorderError::InvalidPosition {
            requested: requested.unwrap_or(u32::MAX),
            max: len,
        })?;
    let target = requested.unwrap_or(max);
    if target < 1 || target > max {
        return Err(ReorderError::InvalidPosition {
            requested: target,
            max,
        });
    }

    let tail = &ordered[(target as usize - 1)..];
    let mut changes = Vec::with_capacity(tail.len() + 1);
    changes.push(PositionChange::inserted(new_id, target));
    for item in tail {
        let position = item.position();
        changes.push(PositionChange::shifted(
            item.item_id(),
            position,
            position + 1,
        ));
    }
    Ok(ChangeSet::from_changes(changes))
}

/// Removes `id` from the scope and closes the gap it leaves.
///
/// # Errors
/// - `ItemNotFound` when `id` is not in the snapshot.
/// - `ScopeCorrupted` when the snapshot is invalid.
pub fn delete<T: Positioned>(items: &[T], id: T::Id) -> ReorderResult<ChangeSet<T::Id>, T::Id> {
    let ordered = order_by_position(items)?;
    let index = locate(&ordered, id)?;

    let tail = &ordered[(index + 1)..];
    let mut changes = Vec::with_capacity(tail.len() + 1);
    changes.push(PositionChange::removed(id, ordered[index].position()));
    for item in tail {
        let position = item.position();
        changes.push(PositionChange::shifted(
            item.item_id(),
            position,
            position - 1,
        ));
    }
    Ok(ChangeSet::from_changes(changes))
}

/// Moves `id` to `target`, shifting only the interval between old and new
/// position by one.
///
/// # Errors
/// - `ItemNotFound` when `id` is not in the snapshot.
/// - `InvalidPosition` when `target` is outside `1..=N`.
/// - `ScopeCorrupted` when the snapshot is invalid.
pub fn move_to<T: Positioned>(
    items: &[T],
    id: T::Id,
    target: u32,
) -> ReorderResult<ChangeSet<T::Id>, T::Id> {
    let ordered = order_by_position(items)?;
    let index = locate(&ordered, id)?;
    let len = scope_len(ordered.len());
    if target < 1 || target > len {
        return Err(ReorderError::InvalidPosition {
            requested: target,
            max: len,
        });
    }

    let current = ordered[index].position();
    if target == current {
        return Ok(ChangeSet::default());
    }

    let (interval, step_forward) = if target < current {
        (&ordered[(target as usize - 1)..index], true)
    } else {
        (&ordered[(index + 1)..(target as usize)], false)
    };

    let mut changes = Vec::with_capacity(interval.len() + 1);
    changes.push(PositionChange::shifted(id, current, target));
    for item in interval {
        let position = item.position();
        let next = if step_forward {
            position + 1
        } else {
            position - 1
        };
        changes.push(PositionChange::shifted(item.item_id(), position, next));
    }
    Ok(ChangeSet::from_changes(changes))
}

/// Re-densifies a possibly corrupted scope to `1..=N`.
///
/// Items keep their relative order by `(position, id)`. Only items whose
/// position changes are returned.
///
/// # Errors
/// - `ScopeCorrupted(DuplicateItem)` when one id appears twice; renumbering
///   cannot repair that.
pub fn compact<T: Positioned>(items: &[T]) -> ReorderResult<ChangeSet<T::Id>, T::Id> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        let id = item.item_id();
        if !seen.insert(id) {
            return Err(ReorderError::ScopeCorrupted(ScopeCorruption::DuplicateItem(
                id,
            )));
        }
    }

    let mut ordered: Vec<&T> = items.iter().collect();
    ordered.sort_by(|left, right| {
        left.position()
            .cmp(&right.position())
            .then_with(|| left.item_id().cmp(&right.item_id()))
    });

    let changes = ordered
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let target = scope_len(index + 1);
            let position = item.position();
            (position != target).then(|| PositionChange::shifted(item.item_id(), position, target))
        })
        .collect();
    Ok(ChangeSet::from_changes(changes))
}

fn order_by_position<T: Positioned>(items: &[T]) -> ReorderResult<Vec<&T>, T::Id> {
    let len = items.len();
    let mut ordered: Vec<Option<&T>> = vec![None; len];
    let mut seen = HashSet::with_capacity(len);

    for item in items {
        let id = item.item_id();
        if !seen.insert(id) {
            return Err(ReorderError::ScopeCorrupted(ScopeCorruption::DuplicateItem(
                id,
            )));
        }

        let position = item.position();
        if position == 0 || position as usize > len {
            return Err(ReorderError::ScopeCorrupted(
                ScopeCorruption::PositionOutOfRange { id, position, len },
            ));
        }

        let slot = &mut ordered[position as usize - 1];
        if let Some(first) = slot {
            return Err(ReorderError::ScopeCorrupted(
                ScopeCorruption::DuplicatePosition {
                    position,
                    first: first.item_id(),
                    second: id,
                },
            ));
        }
        *slot = Some(item);
    }

    // N distinct positions inside 1..=N fill every slot.
    Ok(ordered.into_iter().flatten().collect())
}

fn locate<T: Positioned>(ordered: &[&T], id: T::Id) -> ReorderResult<usize, T::Id> {
    ordered
        .iter()
        .position(|item| item.item_id() == id)
        .ok_or(ReorderError::ItemNotFound(id))
}

fn scope_len(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}
