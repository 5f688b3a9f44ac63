//! Dense position sequences
//!
//! Every parent container (a board for columns, a column for tasks) keeps its
//! children at positions `0..count` with no gaps or duplicates. The desired
//! display order is always expressed as an ordered id list and converted into
//! canonical positions here; nothing else in the engine computes positions.

use crate::types::{BoardId, Column, ColumnId, Task, TaskId};
use indexmap::IndexMap;
use std::hash::Hash;

/// An entity carrying a position among its siblings
pub trait Positioned {
    type Id: Clone + Eq + Hash + std::fmt::Debug;
    type Parent: Clone + Eq + std::fmt::Debug;

    fn id(&self) -> &Self::Id;
    fn parent(&self) -> &Self::Parent;
    fn position(&self) -> usize;
    fn set_position(&mut self, position: usize);
    /// Transfer the entity to another parent container
    fn reparent(&mut self, parent: Self::Parent);
}

impl Positioned for Column {
    type Id = ColumnId;
    type Parent = BoardId;

    fn id(&self) -> &ColumnId {
        &self.id
    }

    fn parent(&self) -> &BoardId {
        &self.board_id
    }

    fn position(&self) -> usize {
        self.position
    }

    fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    fn reparent(&mut self, parent: BoardId) {
        self.board_id = parent;
    }
}

impl Positioned for Task {
    type Id = TaskId;
    type Parent = ColumnId;

    fn id(&self) -> &TaskId {
        &self.id
    }

    fn parent(&self) -> &ColumnId {
        &self.column_id
    }

    fn position(&self) -> usize {
        self.position
    }

    fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    fn reparent(&mut self, parent: ColumnId) {
        self.column_id = parent;
    }
}

/// Assign position = index in the list.
///
/// Pure and total. If an id appears twice the first occurrence wins; callers
/// validate orderings before they get here.
pub fn sequence<I: Clone + Eq + Hash>(ordered_ids: &[I]) -> IndexMap<I, usize> {
    let mut positions = IndexMap::with_capacity(ordered_ids.len());
    for id in ordered_ids {
        let next = positions.len();
        positions.entry(id.clone()).or_insert(next);
    }
    positions
}

/// Sibling ids ordered by their stored position.
///
/// Ties (only possible in already-corrupted data) keep their input order so
/// the result is deterministic and a resequence repairs them.
pub fn ordered_ids<'a, T, It>(siblings: It) -> Vec<T::Id>
where
    T: Positioned + 'a,
    It: IntoIterator<Item = &'a T>,
{
    let mut items: Vec<&T> = siblings.into_iter().collect();
    items.sort_by_key(|item| item.position());
    items.into_iter().map(|item| item.id().clone()).collect()
}

/// Write the positions of `ordering` onto every sibling it names.
///
/// Returns the number of entities whose stored position actually changed.
pub fn apply_sequence<'a, T, It>(siblings: It, ordering: &IndexMap<T::Id, usize>) -> usize
where
    T: Positioned + 'a,
    It: IntoIterator<Item = &'a mut T>,
{
    let mut changed = 0;
    for sibling in siblings {
        if let Some(&position) = ordering.get(sibling.id()) {
            if sibling.position() != position {
                sibling.set_position(position);
                changed += 1;
            }
        }
    }
    changed
}

/// Whether the positions form exactly `{0, 1, ..., count-1}`
pub fn is_dense(positions: impl IntoIterator<Item = usize>) -> bool {
    let mut positions: Vec<usize> = positions.into_iter().collect();
    positions.sort_unstable();
    positions.iter().enumerate().all(|(index, &p)| index == p)
}
