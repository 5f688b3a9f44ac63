//! Reorder computations for columns within a board and tasks within a column
//!
//! Everything here works on ordered id lists and returns the complete
//! resulting order of every touched parent. Positions come from
//! [`position::sequence`](crate::position::sequence) over those lists, so a
//! stale index or a concurrently changed sibling set can never leave a gap
//! or a duplicate behind.

use crate::config::Placement;
use crate::error::{BoardError, Result};
use crate::position::{self, Positioned};
use indexmap::IndexMap;
use std::collections::HashSet;
use std::hash::Hash;

/// Outcome of moving an entity from one parent container to another
#[derive(Debug, Clone, PartialEq)]
pub struct CrossParentMove<T: Positioned> {
    /// The moved entity, re-parented and carrying its new position
    pub entity: T,
    /// Remaining order of the source container
    pub source: Vec<T::Id>,
    /// Resulting order of the destination container
    pub destination: Vec<T::Id>,
}

/// Move `entity` to `target_index` among `siblings`.
///
/// The entity is removed from its current slot if present, then inserted at
/// `target_index` clamped to the end of the list. Moving to the current index
/// returns the list unchanged.
pub fn move_within_parent<I: Clone + Eq>(entity: &I, siblings: &[I], target_index: usize) -> Vec<I> {
    let mut ordered: Vec<I> = siblings.iter().filter(|id| *id != entity).cloned().collect();
    let index = target_index.min(ordered.len());
    ordered.insert(index, entity.clone());
    ordered
}

/// Move `entity` out of `source_siblings` into `dest_siblings` at `target_index`.
///
/// The entity ends up a member of exactly one of the two lists (the
/// destination) and is re-parented to `destination`.
pub fn move_across_parents<T>(
    entity: &T,
    destination: T::Parent,
    source_siblings: &[T::Id],
    dest_siblings: &[T::Id],
    target_index: usize,
) -> CrossParentMove<T>
where
    T: Positioned + Clone,
{
    let id = entity.id();
    let source: Vec<T::Id> = source_siblings.iter().filter(|s| *s != id).cloned().collect();
    let destination_order = move_within_parent(id, dest_siblings, target_index);

    let mut moved = entity.clone();
    moved.reparent(destination);
    if let Some(index) = destination_order.iter().position(|d| d == id) {
        moved.set_position(index);
    }

    CrossParentMove {
        entity: moved,
        source,
        destination: destination_order,
    }
}

/// Position for a newly created entity appended to `siblings`
pub fn insert_at_end<I>(siblings: &[I]) -> usize {
    siblings.len()
}

/// Order after inserting a new entity according to `placement`
pub fn insert_new<I: Clone + Eq>(entity: &I, siblings: &[I], placement: Placement) -> Vec<I> {
    let index = match placement {
        Placement::End => insert_at_end(siblings),
        Placement::Start => 0,
    };
    move_within_parent(entity, siblings, index)
}

/// Positions for the siblings left behind after a deletion.
///
/// `siblings_after_deletion` pairs each remaining id with its stored
/// position. Every sibling after `deleted_position` moves up by one; the
/// result is computed as a full resequence of the remaining order, which is
/// also correct when a concurrent insert already shifted positions.
pub fn close_gap_on_delete<I: Clone + Eq + Hash>(
    deleted_position: usize,
    siblings_after_deletion: &[(I, usize)],
) -> IndexMap<I, usize> {
    let mut remaining: Vec<&(I, usize)> = siblings_after_deletion.iter().collect();
    remaining.sort_by_key(|(_, stored)| *stored);
    tracing::trace!(
        deleted_position,
        remaining = remaining.len(),
        "resequencing siblings after delete"
    );
    let ordered: Vec<I> = remaining.into_iter().map(|(id, _)| id.clone()).collect();
    position::sequence(&ordered)
}

/// Reconcile a client-supplied destination ordering with the current siblings.
///
/// `requested` is the full destination order the client saw after its drop.
/// The result is always a permutation of `current_siblings` plus `entity`:
/// - duplicate ids are rejected
/// - `entity` must appear in `requested`
/// - ids that are no longer destination siblings are dropped as stale
/// - current siblings the client did not list (created concurrently) are
///   appended after the listed ones, in their current relative order
pub fn merge_requested_order<I>(entity: &I, current_siblings: &[I], requested: &[I]) -> Result<Vec<I>>
where
    I: Clone + Eq + Hash + std::fmt::Display,
{
    let mut seen = HashSet::with_capacity(requested.len());
    for id in requested {
        if !seen.insert(id) {
            return Err(BoardError::DuplicateSibling { id: id.to_string() });
        }
    }
    if !seen.contains(entity) {
        return Err(BoardError::invalid_value(
            "ordered_task_ids",
            format!("ordering must include the moved entity {}", entity),
        ));
    }

    let current: HashSet<&I> = current_siblings.iter().collect();
    let mut merged: Vec<I> = requested
        .iter()
        .filter(|id| *id == entity || current.contains(id))
        .cloned()
        .collect();

    let listed: HashSet<&I> = requested.iter().collect();
    merged.extend(
        current_siblings
            .iter()
            .filter(|id| !listed.contains(id) && *id != entity)
            .cloned(),
    );

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ColumnId, Task, TaskId};
    use proptest::prelude::*;

    fn ids(names: &[&str]) -> Vec<TaskId> {
        names.iter().map(|n| TaskId::from_string(*n)).collect()
    }

    #[test]
    fn test_move_last_to_front() {
        let order = move_within_parent(&"C", &["A", "B", "C"], 0);
        assert_eq!(order, vec!["C", "A", "B"]);
        let seq = position::sequence(&order);
        assert_eq!(seq["C"], 0);
        assert_eq!(seq["A"], 1);
        assert_eq!(seq["B"], 2);
    }

    #[test]
    fn test_move_to_same_index_is_noop() {
        let siblings = ["w", "x", "y", "z"];
        assert_eq!(move_within_parent(&"y", &siblings, 2), siblings.to_vec());
    }

    #[test]
    fn test_move_beyond_bounds_clamps_to_end() {
        assert_eq!(move_within_parent(&"a", &["a", "b", "c"], 99), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_move_entity_not_in_list_inserts() {
        assert_eq!(move_within_parent(&"n", &["a", "b"], 1), vec!["a", "n", "b"]);
    }

    #[test]
    fn test_move_across_parents_scenario() {
        // T in X (3 tasks) to Y (2 tasks) at index 1
        let mut t = Task::new("X", "u", "T");
        t.id = TaskId::from_string("T");
        t.position = 1;

        let result = move_across_parents(
            &t,
            ColumnId::from_string("Y"),
            &ids(&["A", "T", "B"]),
            &ids(&["C", "D"]),
            1,
        );

        assert_eq!(result.source, ids(&["A", "B"]));
        assert_eq!(result.destination, ids(&["C", "T", "D"]));
        assert_eq!(result.entity.column_id, ColumnId::from_string("Y"));
        assert_eq!(result.entity.position, 1);
    }

    #[test]
    fn test_insert_placement() {
        let siblings = ["a", "b"];
        assert_eq!(insert_at_end(&siblings), 2);
        assert_eq!(insert_new(&"n", &siblings, Placement::End), vec!["a", "b", "n"]);
        assert_eq!(insert_new(&"n", &siblings, Placement::Start), vec!["n", "a", "b"]);
    }

    #[test]
    fn test_close_gap_matches_decrement() {
        // [a0 b1 c2 d3], delete b
        let remaining = [("a", 0), ("c", 2), ("d", 3)];
        let seq = close_gap_on_delete(1, &remaining);
        assert_eq!(seq["a"], 0);
        assert_eq!(seq["c"], 1);
        assert_eq!(seq["d"], 2);
    }

    #[test]
    fn test_close_gap_with_interleaved_insert() {
        // A head insert already shifted everything by one and left a duplicate at 2
        let remaining = [("new", 0), ("a", 1), ("c", 2), ("d", 3), ("e", 2)];
        let seq = close_gap_on_delete(2, &remaining);
        assert!(position::is_dense(seq.values().copied()));
        assert_eq!(seq.len(), 5);
        assert_eq!(seq["new"], 0);
        assert_eq!(seq["a"], 1);
    }

    #[test]
    fn test_delete_last_then_append_parity() {
        let remaining = [("a", 0), ("b", 1)];
        let seq = close_gap_on_delete(2, &remaining);
        let order: Vec<&str> = seq.keys().copied().collect();
        assert_eq!(insert_at_end(&order), 2);
    }

    #[test]
    fn test_merge_requested_exact_permutation() {
        let merged = merge_requested_order(
            &TaskId::from("t"),
            &ids(&["a", "b"]),
            &ids(&["b", "t", "a"]),
        )
        .unwrap();
        assert_eq!(merged, ids(&["b", "t", "a"]));
    }

    #[test]
    fn test_merge_requested_drops_stale_and_appends_missing() {
        // "gone" moved elsewhere, "fresh" was created concurrently
        let merged = merge_requested_order(
            &TaskId::from("t"),
            &ids(&["a", "b", "fresh"]),
            &ids(&["t", "gone", "b", "a"]),
        )
        .unwrap();
        assert_eq!(merged, ids(&["t", "b", "a", "fresh"]));
    }

    #[test]
    fn test_merge_requested_rejects_duplicates() {
        let err = merge_requested_order(&TaskId::from("t"), &ids(&["a"]), &ids(&["t", "a", "a"]))
            .unwrap_err();
        assert!(matches!(err, BoardError::DuplicateSibling { .. }));
    }

    #[test]
    fn test_merge_requested_requires_entity() {
        let err = merge_requested_order(&TaskId::from("t"), &ids(&["a"]), &ids(&["a"])).unwrap_err();
        assert!(matches!(err, BoardError::InvalidValue { .. }));
    }

    proptest! {
        #[test]
        fn prop_move_round_trip(len in 1usize..20, from_seed in 0usize..100, to_seed in 0usize..100) {
            let siblings: Vec<usize> = (0..len).collect();
            let from = from_seed % len;
            let to = to_seed % len;
            let entity = siblings[from];

            let moved = move_within_parent(&entity, &siblings, to);
            prop_assert_eq!(moved.iter().position(|e| *e == entity), Some(to));
            let back = move_within_parent(&entity, &moved, from);
            prop_assert_eq!(back, siblings);
        }

        #[test]
        fn prop_cross_parent_conservation(
            source_len in 1usize..15,
            dest_len in 0usize..15,
            pick in 0usize..100,
            target in 0usize..30,
        ) {
            let source: Vec<TaskId> = (0..source_len).map(|i| TaskId::from_string(format!("s{i}"))).collect();
            let dest: Vec<TaskId> = (0..dest_len).map(|i| TaskId::from_string(format!("d{i}"))).collect();
            let mut entity = Task::new("src", "u", "moved");
            entity.id = source[pick % source_len].clone();

            let result = move_across_parents(&entity, ColumnId::from_string("dst"), &source, &dest, target);

            prop_assert_eq!(result.source.len() + result.destination.len(), source_len + dest_len);
            prop_assert!(!result.source.contains(&entity.id));
            prop_assert_eq!(result.destination.iter().filter(|d| **d == entity.id).count(), 1);
            prop_assert_eq!(result.entity.position, target.min(dest_len));
            prop_assert!(position::is_dense(position::sequence(&result.source).values().copied()));
            prop_assert!(position::is_dense(position::sequence(&result.destination).values().copied()));
        }
    }
}
