//! Drag gesture state machine
//!
//! ```text
//! Idle --begin_drag--> Dragging --drop--> Reconciling --success--> Idle
//!                         |                    |
//!                    cancel_drag            failure (RolledBack)
//!                         v                    v
//!                        Idle                 Idle
//! ```

use super::view::{apply_change, BoardView};
use crate::error::{BoardError, Result};
use crate::column::MoveColumn;
use crate::mutation::Mutation;
use crate::reorder;
use crate::task::MoveTask;
use crate::types::{AffectedState, BoardEvent, BoardState, ClientId, ColumnId, TaskId};

/// What is being dragged
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragItem {
    Task(TaskId),
    Column(ColumnId),
}

/// Where the dragged item is hovering or was dropped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// Index among the board's columns
    Column { index: usize },
    /// Index within a column's tasks
    Task { column_id: ColumnId, index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Dragging(DragItem),
    /// A mutation was sent and its result is pending
    Reconciling(DragItem),
}

/// Result of feeding something into the reconciler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// An authoritative change was applied to the view
    Applied,
    /// The pending mutation was confirmed and the view replaced
    Reconciled,
    /// Optimistic state was discarded and the last known-good view restored
    RolledBack,
    /// Nothing to do (old, duplicate or foreign event)
    Ignored,
}

/// Reconciles one board's local view with authoritative changes
#[derive(Debug, Clone)]
pub struct BoardReconciler {
    client_id: Option<ClientId>,
    /// Authoritative view: only server results and broadcasts change it
    confirmed: BoardView,
    /// What the user sees: `confirmed` plus any optimistic patch
    working: BoardView,
    phase: Phase,
    needs_resync: bool,
}

impl BoardReconciler {
    pub fn new(state: &BoardState, client_id: Option<ClientId>) -> Self {
        let view = BoardView::from_state(state);
        Self {
            client_id,
            confirmed: view.clone(),
            working: view,
            phase: Phase::Idle,
            needs_resync: false,
        }
    }

    /// The view to render
    pub fn view(&self) -> &BoardView {
        &self.working
    }

    /// The last authoritative view
    pub fn confirmed(&self) -> &BoardView {
        &self.confirmed
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Whether the client must refetch the board (missed events, unknown ids,
    /// or an error that invalidated local ids)
    pub fn needs_resync(&self) -> bool {
        self.needs_resync || self.confirmed.stale
    }

    /// Replace everything with a freshly fetched state
    pub fn resync(&mut self, state: &BoardState) {
        let view = BoardView::from_state(state);
        self.confirmed = view.clone();
        self.working = view;
        self.phase = Phase::Idle;
        self.needs_resync = false;
        tracing::debug!(board_id = %state.id(), version = state.version, "view resynced");
    }

    /// Start a drag. Local state is not touched yet.
    pub fn begin_drag(&mut self, item: DragItem) -> Result<()> {
        if self.phase != Phase::Idle {
            return Err(BoardError::invalid_value(
                "drag",
                "another drag or mutation is in progress",
            ));
        }
        match &item {
            DragItem::Task(id) if self.working.task(id).is_none() => {
                return Err(BoardError::TaskNotFound { id: id.to_string() })
            }
            DragItem::Column(id) if self.working.column(id).is_none() => {
                return Err(BoardError::ColumnNotFound { id: id.to_string() })
            }
            _ => {}
        }
        self.phase = Phase::Dragging(item);
        Ok(())
    }

    /// Optimistically show the dragged item at `target`
    pub fn drag_over(&mut self, target: &DropTarget) -> Result<()> {
        let Phase::Dragging(item) = &self.phase else {
            return Err(BoardError::invalid_value("drag", "no drag in progress"));
        };
        let item = item.clone();
        self.splice(&item, target)
    }

    /// Abandon the gesture; no mutation is sent
    pub fn cancel_drag(&mut self) {
        if matches!(self.phase, Phase::Dragging(_)) {
            self.working = self.confirmed.clone();
            self.phase = Phase::Idle;
        }
    }

    /// Finish the gesture at `target` and produce the mutation to send
    pub fn drop(&mut self, target: &DropTarget) -> Result<Mutation> {
        let Phase::Dragging(item) = &self.phase else {
            return Err(BoardError::invalid_value("drag", "no drag in progress"));
        };
        let item = item.clone();
        self.splice(&item, target)?;

        let mutation = match (&item, target) {
            (DragItem::Task(task_id), DropTarget::Task { column_id, .. }) => {
                MoveTask::new(task_id, column_id, self.working.task_ids(column_id)).into()
            }
            (DragItem::Column(column_id), DropTarget::Column { index }) => {
                MoveColumn::new(column_id, *index).into()
            }
            _ => return Err(BoardError::invalid_value("target", "mismatched drop target")),
        };
        self.phase = Phase::Reconciling(item);
        Ok(mutation)
    }

    /// The server accepted the mutation
    pub fn on_success(&mut self, affected: &AffectedState) -> Outcome {
        if !matches!(self.phase, Phase::Reconciling(_)) {
            return Outcome::Ignored;
        }
        if affected.version > self.confirmed.version + 1 {
            // the skipped events will arrive as old and be ignored
            tracing::warn!(
                board_id = %affected.board_id,
                expected = self.confirmed.version + 1,
                got = affected.version,
                "response skipped versions"
            );
            self.needs_resync = true;
        }
        self.confirm(affected.version, |view| apply_change(view, &affected.change));
        self.working = self.confirmed.clone();
        self.phase = Phase::Idle;
        Outcome::Reconciled
    }

    /// The server rejected the mutation; restore the pre-drag view
    pub fn on_failure(&mut self, error: &BoardError) -> Outcome {
        if !matches!(self.phase, Phase::Reconciling(_)) {
            return Outcome::Ignored;
        }
        tracing::warn!(%error, "mutation rejected, rolling back");
        if error.requires_refetch() {
            self.needs_resync = true;
        }
        self.working = self.confirmed.clone();
        self.phase = Phase::Idle;
        Outcome::RolledBack
    }

    /// A broadcast arrived on the board topic
    pub fn on_event(&mut self, event: &BoardEvent) -> Outcome {
        if event.board_id != self.confirmed.board_id || event.sequence <= self.confirmed.version {
            return Outcome::Ignored;
        }
        if event.sequence > self.confirmed.version + 1 {
            tracing::warn!(
                board_id = %event.board_id,
                expected = self.confirmed.version + 1,
                got = event.sequence,
                "missed events"
            );
            self.needs_resync = true;
        }

        self.confirm(event.sequence, |view| apply_change(view, &event.change));

        let own = event.origin.is_some() && event.origin == self.client_id;
        match &self.phase {
            Phase::Reconciling(_) if own => {
                self.working = self.confirmed.clone();
                self.phase = Phase::Idle;
                Outcome::Reconciled
            }
            Phase::Idle => {
                self.working = self.confirmed.clone();
                Outcome::Applied
            }
            Phase::Dragging(item) | Phase::Reconciling(item) => {
                if self.item_exists(item) {
                    self.working = apply_change(&self.working, &event.change);
                    Outcome::Applied
                } else {
                    // the dragged item was removed remotely
                    self.working = self.confirmed.clone();
                    self.phase = Phase::Idle;
                    Outcome::RolledBack
                }
            }
        }
    }

    fn confirm(&mut self, version: u64, apply: impl FnOnce(&BoardView) -> BoardView) {
        if version <= self.confirmed.version {
            return;
        }
        self.confirmed = apply(&self.confirmed);
        self.confirmed.version = version;
    }

    fn item_exists(&self, item: &DragItem) -> bool {
        match item {
            DragItem::Task(id) => self.confirmed.task(id).is_some(),
            DragItem::Column(id) => self.confirmed.column(id).is_some(),
        }
    }

    fn splice(&mut self, item: &DragItem, target: &DropTarget) -> Result<()> {
        match (item, target) {
            (DragItem::Task(task_id), DropTarget::Task { column_id, index }) => {
                if self.working.column(column_id).is_none() {
                    return Err(BoardError::ColumnNotFound {
                        id: column_id.to_string(),
                    });
                }
                let Some(task) = self.working.remove_task(task_id) else {
                    return Err(BoardError::TaskNotFound {
                        id: task_id.to_string(),
                    });
                };
                let siblings = self.working.task_ids(column_id);
                let order = reorder::move_within_parent(task_id, &siblings, *index);
                if let Some(column) = self.working.columns.iter_mut().find(|c| c.id() == column_id) {
                    column.tasks.push(task);
                }
                self.working.order_tasks(column_id, &order);
                Ok(())
            }
            (DragItem::Column(column_id), DropTarget::Column { index }) => {
                let order =
                    reorder::move_within_parent(column_id, &self.working.column_ids(), *index);
                self.working.order_columns(&order);
                Ok(())
            }
            _ => Err(BoardError::invalid_value(
                "target",
                "tasks drop into columns and columns drop onto the board",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Board, BoardChange, Column, Task};

    struct Fixture {
        state: BoardState,
        columns: Vec<ColumnId>,
        tasks: Vec<TaskId>,
    }

    /// Columns X and Y; X holds A, B, C and Y holds D
    fn fixture() -> Fixture {
        let mut state = BoardState::new(Board::new("B", "owner"));
        let x = Column::new(state.id().clone(), "X");
        let mut y = Column::new(state.id().clone(), "Y");
        y.position = 1;
        let mut tasks = Vec::new();
        for (i, title) in ["A", "B", "C"].iter().enumerate() {
            let mut task = Task::new(x.id.clone(), "owner", *title);
            task.position = i;
            tasks.push(task);
        }
        tasks.push(Task::new(y.id.clone(), "owner", "D"));
        let columns = vec![x.id.clone(), y.id.clone()];
        let task_ids = tasks.iter().map(|t| t.id.clone()).collect();
        state.columns = vec![x, y];
        state.tasks = tasks;
        state.version = 5;
        Fixture {
            state,
            columns,
            tasks: task_ids,
        }
    }

    fn moved_event(f: &Fixture, sequence: u64, origin: Option<ClientId>) -> BoardEvent {
        let (c, t) = (&f.columns, &f.tasks);
        let mut task = f.state.task(&t[0]).cloned().unwrap();
        task.column_id = c[1].clone();
        task.position = 1;
        BoardEvent {
            board_id: f.state.id().clone(),
            sequence,
            origin,
            change: BoardChange::TaskMoved {
                task,
                from_column_id: c[0].clone(),
                to_column_id: c[1].clone(),
                from_task_ids: vec![t[1].clone(), t[2].clone()],
                to_task_ids: vec![t[3].clone(), t[0].clone()],
            },
        }
    }

    #[test]
    fn test_drag_is_optimistic_and_produces_full_ordering() {
        let f = fixture();
        let (c, t) = (&f.columns, &f.tasks);
        let mut r = BoardReconciler::new(&f.state, Some("me".into()));

        r.begin_drag(DragItem::Task(t[0].clone())).unwrap();
        assert_eq!(r.view(), r.confirmed());

        let target = DropTarget::Task {
            column_id: c[1].clone(),
            index: 1,
        };
        r.drag_over(&target).unwrap();
        assert_eq!(r.view().task_ids(&c[1]), vec![t[3].clone(), t[0].clone()]);

        let mutation = r.drop(&target).unwrap();
        let Mutation::MoveTask(op) = mutation else {
            panic!("expected a task move");
        };
        assert_eq!(op.destination_column_id, c[1]);
        assert_eq!(op.ordered_task_ids, vec![t[3].clone(), t[0].clone()]);
        assert!(matches!(r.phase(), Phase::Reconciling(_)));
        // confirmed view is untouched until the server answers
        assert_eq!(r.confirmed().task_ids(&c[0]).len(), 3);
    }

    #[test]
    fn test_failure_rolls_back() {
        let f = fixture();
        let (c, t) = (&f.columns, &f.tasks);
        let mut r = BoardReconciler::new(&f.state, None);
        let before = r.view().clone();

        r.begin_drag(DragItem::Task(t[2].clone())).unwrap();
        r.drop(&DropTarget::Task {
            column_id: c[0].clone(),
            index: 0,
        })
        .unwrap();
        assert_ne!(r.view(), &before);

        let outcome = r.on_failure(&BoardError::LockTimeout { elapsed_ms: 5000 });
        assert_eq!(outcome, Outcome::RolledBack);
        assert_eq!(r.view(), &before);
        assert_eq!(r.phase(), &Phase::Idle);
        assert!(!r.needs_resync());
    }

    #[test]
    fn test_not_found_failure_requests_resync() {
        let f = fixture();
        let mut r = BoardReconciler::new(&f.state, None);
        r.begin_drag(DragItem::Column(f.columns[1].clone())).unwrap();
        r.drop(&DropTarget::Column { index: 0 }).unwrap();

        r.on_failure(&BoardError::ColumnNotFound { id: "x".into() });
        assert!(r.needs_resync());
    }

    #[test]
    fn test_own_echo_completes_reconciliation() {
        let f = fixture();
        let (c, t) = (&f.columns, &f.tasks);
        let mut r = BoardReconciler::new(&f.state, Some("me".into()));

        r.begin_drag(DragItem::Task(t[0].clone())).unwrap();
        r.drop(&DropTarget::Task {
            column_id: c[1].clone(),
            index: 1,
        })
        .unwrap();

        let outcome = r.on_event(&moved_event(&f, 6, Some("me".into())));
        assert_eq!(outcome, Outcome::Reconciled);
        assert_eq!(r.phase(), &Phase::Idle);
        assert_eq!(r.view(), r.confirmed());
        assert_eq!(r.confirmed().version, 6);

        // the response arriving after its echo changes nothing
        let affected = AffectedState {
            board_id: f.state.id().clone(),
            version: 6,
            change: moved_event(&f, 6, None).change,
        };
        assert_eq!(r.on_success(&affected), Outcome::Ignored);
    }

    #[test]
    fn test_success_replaces_view() {
        let f = fixture();
        let (c, t) = (&f.columns, &f.tasks);
        let mut r = BoardReconciler::new(&f.state, Some("me".into()));

        r.begin_drag(DragItem::Task(t[0].clone())).unwrap();
        // the user dropped at index 0, the server put it at index 1
        r.drop(&DropTarget::Task {
            column_id: c[1].clone(),
            index: 0,
        })
        .unwrap();

        let affected = AffectedState {
            board_id: f.state.id().clone(),
            version: 6,
            change: moved_event(&f, 6, None).change,
        };
        assert_eq!(r.on_success(&affected), Outcome::Reconciled);
        assert_eq!(r.view().task_ids(&c[1]), vec![t[3].clone(), t[0].clone()]);

        // the echo of the same commit is now old
        assert_eq!(r.on_event(&moved_event(&f, 6, Some("me".into()))), Outcome::Ignored);
    }

    #[test]
    fn test_remote_event_while_idle() {
        let f = fixture();
        let (c, t) = (&f.columns, &f.tasks);
        let mut r = BoardReconciler::new(&f.state, Some("me".into()));

        assert_eq!(r.on_event(&moved_event(&f, 6, Some("other".into()))), Outcome::Applied);
        assert_eq!(r.view().task_ids(&c[0]), vec![t[1].clone(), t[2].clone()]);
        assert_eq!(r.on_event(&moved_event(&f, 6, None)), Outcome::Ignored);
    }

    #[test]
    fn test_remote_event_overwrites_dragging_view() {
        let f = fixture();
        let (c, t) = (&f.columns, &f.tasks);
        let mut r = BoardReconciler::new(&f.state, Some("me".into()));

        r.begin_drag(DragItem::Task(t[2].clone())).unwrap();
        r.drag_over(&DropTarget::Task {
            column_id: c[0].clone(),
            index: 0,
        })
        .unwrap();

        let outcome = r.on_event(&moved_event(&f, 6, Some("other".into())));
        assert_eq!(outcome, Outcome::Applied);
        assert_eq!(r.view().task_ids(&c[0]), vec![t[1].clone(), t[2].clone()]);
        assert!(matches!(r.phase(), Phase::Dragging(_)));

        r.cancel_drag();
        assert_eq!(r.view(), r.confirmed());
        assert_eq!(r.confirmed().task_ids(&c[1]), vec![t[3].clone(), t[0].clone()]);
    }

    #[test]
    fn test_dragged_item_deleted_remotely() {
        let f = fixture();
        let (c, t) = (&f.columns, &f.tasks);
        let mut r = BoardReconciler::new(&f.state, None);
        r.begin_drag(DragItem::Task(t[1].clone())).unwrap();

        let event = BoardEvent {
            board_id: f.state.id().clone(),
            sequence: 6,
            origin: None,
            change: BoardChange::TaskDeleted {
                task_id: t[1].clone(),
                column_id: c[0].clone(),
                task_ids: vec![t[0].clone(), t[2].clone()],
            },
        };
        assert_eq!(r.on_event(&event), Outcome::RolledBack);
        assert_eq!(r.phase(), &Phase::Idle);
    }

    #[test]
    fn test_sequence_gap_requests_resync() {
        let f = fixture();
        let mut r = BoardReconciler::new(&f.state, None);
        r.on_event(&moved_event(&f, 8, None));
        assert!(r.needs_resync());

        r.resync(&f.state);
        assert!(!r.needs_resync());
        assert_eq!(r.view().version, 5);
    }

    #[test]
    fn test_success_skipping_versions_requests_resync() {
        let f = fixture();
        let (c, t) = (&f.columns, &f.tasks);
        let mut r = BoardReconciler::new(&f.state, Some("me".into()));

        r.begin_drag(DragItem::Column(c[1].clone())).unwrap();
        r.drop(&DropTarget::Column { index: 0 }).unwrap();

        // our move committed as v7; a remote v6 is still in flight
        let affected = AffectedState {
            board_id: f.state.id().clone(),
            version: 7,
            change: BoardChange::ColumnMoved {
                board_id: f.state.id().clone(),
                column_ids: vec![c[1].clone(), c[0].clone()],
            },
        };
        assert_eq!(r.on_success(&affected), Outcome::Reconciled);
        assert!(r.needs_resync());

        let late = moved_event(&f, 6, Some("other".into()));
        assert_eq!(r.on_event(&late), Outcome::Ignored);
        assert!(r.needs_resync());

        let mut authoritative = f.state.clone();
        let mut moved = authoritative.task(&t[0]).cloned().unwrap();
        moved.column_id = c[1].clone();
        moved.position = 1;
        authoritative.tasks.retain(|task| task.id != t[0]);
        authoritative.tasks.push(moved);
        authoritative.apply_task_order(&c[0], &[t[1].clone(), t[2].clone()]);
        authoritative.apply_column_order(&[c[1].clone(), c[0].clone()]);
        authoritative.version = 7;

        r.resync(&authoritative);
        assert!(!r.needs_resync());
        assert_eq!(r.view().column_ids(), vec![c[1].clone(), c[0].clone()]);
        assert_eq!(r.view().task_ids(&c[0]), vec![t[1].clone(), t[2].clone()]);
        assert_eq!(r.view().task_ids(&c[1]), vec![t[3].clone(), t[0].clone()]);
    }

    #[test]
    fn test_next_version_success_needs_no_resync() {
        let f = fixture();
        let c = &f.columns;
        let mut r = BoardReconciler::new(&f.state, Some("me".into()));

        r.begin_drag(DragItem::Column(c[1].clone())).unwrap();
        r.drop(&DropTarget::Column { index: 0 }).unwrap();
        let affected = AffectedState {
            board_id: f.state.id().clone(),
            version: 6,
            change: BoardChange::ColumnMoved {
                board_id: f.state.id().clone(),
                column_ids: vec![c[1].clone(), c[0].clone()],
            },
        };
        assert_eq!(r.on_success(&affected), Outcome::Reconciled);
        assert!(!r.needs_resync());
    }

    #[test]
    fn test_success_while_dragging_is_ignored() {
        let f = fixture();
        let (c, t) = (&f.columns, &f.tasks);
        let mut r = BoardReconciler::new(&f.state, Some("me".into()));

        r.begin_drag(DragItem::Task(t[2].clone())).unwrap();
        r.drag_over(&DropTarget::Task {
            column_id: c[0].clone(),
            index: 0,
        })
        .unwrap();
        let dragging = r.view().clone();

        let affected = AffectedState {
            board_id: f.state.id().clone(),
            version: 6,
            change: moved_event(&f, 6, None).change,
        };
        assert_eq!(r.on_success(&affected), Outcome::Ignored);
        assert!(matches!(r.phase(), Phase::Dragging(_)));
        assert_eq!(r.view(), &dragging);
        assert_eq!(r.confirmed().version, 5);
    }

    #[test]
    fn test_mismatched_target_rejected() {
        let f = fixture();
        let mut r = BoardReconciler::new(&f.state, None);
        r.begin_drag(DragItem::Column(f.columns[0].clone())).unwrap();
        let err = r
            .drag_over(&DropTarget::Task {
                column_id: f.columns[1].clone(),
                index: 0,
            })
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Validation);
    }

    #[test]
    fn test_second_drag_rejected() {
        let f = fixture();
        let mut r = BoardReconciler::new(&f.state, None);
        r.begin_drag(DragItem::Task(f.tasks[0].clone())).unwrap();
        assert!(r.begin_drag(DragItem::Task(f.tasks[1].clone())).is_err());
    }
}
