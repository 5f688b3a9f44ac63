//! Per-client registry of open boards

use super::drag::{BoardReconciler, Outcome};
use crate::types::{BoardEvent, BoardId, BoardState, ClientId};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// All boards a client has open, keyed by board id
#[derive(Debug, Default)]
pub struct ClientStore {
    client_id: Option<ClientId>,
    boards: HashMap<BoardId, BoardReconciler>,
}

impl ClientStore {
    pub fn new(client_id: impl Into<ClientId>) -> Self {
        Self {
            client_id: Some(client_id.into()),
            boards: HashMap::new(),
        }
    }

    pub fn client_id(&self) -> Option<&ClientId> {
        self.client_id.as_ref()
    }

    /// Start tracking a board from a fetched snapshot, replacing any
    /// previous view of it
    pub fn open(&mut self, state: &BoardState) -> &mut BoardReconciler {
        let reconciler = BoardReconciler::new(state, self.client_id.clone());
        match self.boards.entry(state.id().clone()) {
            Entry::Occupied(mut slot) => {
                slot.insert(reconciler);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(reconciler),
        }
    }

    pub fn close(&mut self, board_id: &BoardId) -> Option<BoardReconciler> {
        self.boards.remove(board_id)
    }

    pub fn get(&self, board_id: &BoardId) -> Option<&BoardReconciler> {
        self.boards.get(board_id)
    }

    pub fn get_mut(&mut self, board_id: &BoardId) -> Option<&mut BoardReconciler> {
        self.boards.get_mut(board_id)
    }

    /// Route a broadcast to the board it belongs to
    pub fn on_event(&mut self, event: &BoardEvent) -> Outcome {
        match self.boards.get_mut(&event.board_id) {
            Some(reconciler) => reconciler.on_event(event),
            None => Outcome::Ignored,
        }
    }

    /// Boards whose views must be refetched
    pub fn stale_boards(&self) -> Vec<BoardId> {
        self.boards
            .iter()
            .filter(|(_, r)| r.needs_resync())
            .map(|(id, _)| id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Board, BoardChange, Column};

    fn board(title: &str) -> BoardState {
        let mut state = BoardState::new(Board::new(title, "owner"));
        state.columns.push(Column::new(state.id().clone(), "X"));
        state
    }

    fn rename_event(state: &BoardState, sequence: u64) -> BoardEvent {
        let mut column = state.columns[0].clone();
        column.title = "Renamed".into();
        BoardEvent {
            board_id: state.id().clone(),
            sequence,
            origin: None,
            change: BoardChange::ColumnUpdated { column },
        }
    }

    #[test]
    fn test_events_route_by_board() {
        let one = board("one");
        let two = board("two");
        let mut store = ClientStore::new("tab");
        store.open(&one);
        store.open(&two);

        assert_eq!(store.on_event(&rename_event(&two, 1)), Outcome::Applied);

        let title = |s: &ClientStore, b: &BoardState| {
            s.get(b.id()).unwrap().view().columns[0].column.title.clone()
        };
        assert_eq!(title(&store, &one), "X");
        assert_eq!(title(&store, &two), "Renamed");
    }

    #[test]
    fn test_unknown_board_ignored() {
        let mut store = ClientStore::new("tab");
        assert_eq!(store.on_event(&rename_event(&board("x"), 1)), Outcome::Ignored);
    }

    #[test]
    fn test_stale_boards_and_close() {
        let one = board("one");
        let mut store = ClientStore::new("tab");
        store.open(&one);
        assert!(store.stale_boards().is_empty());

        store.on_event(&rename_event(&one, 3));
        assert_eq!(store.stale_boards(), vec![one.id().clone()]);

        store.open(&one);
        assert!(store.stale_boards().is_empty());
        assert!(store.close(one.id()).is_some());
        assert!(store.get(one.id()).is_none());
    }
}
