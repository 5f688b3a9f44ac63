//! In-process store

use super::{BoardStore, LockOptions};
use crate::error::{BoardError, Result};
use crate::types::{BoardId, BoardState, ColumnId, TaskId};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use taskboard_operations::LogEntry;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Boards held in memory, one async mutex per board
#[derive(Default)]
pub struct MemoryStore {
    boards: DashMap<BoardId, BoardState>,
    locks: DashMap<BoardId, Arc<Mutex<()>>>,
    task_index: DashMap<TaskId, BoardId>,
    column_index: DashMap<ColumnId, BoardId>,
    activity: std::sync::Mutex<Vec<LogEntry>>,
}

/// Held board lock of a [`MemoryStore`]
#[derive(Debug)]
pub struct MemoryGuard {
    board_id: BoardId,
    _guard: OwnedMutexGuard<()>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, board_id: &BoardId) -> Arc<Mutex<()>> {
        self.locks
            .entry(board_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn reindex(&self, previous: Option<&BoardState>, state: &BoardState) {
        if let Some(previous) = previous {
            for task in &previous.tasks {
                if state.task(&task.id).is_none() {
                    self.task_index.remove(&task.id);
                }
            }
            for column in &previous.columns {
                if state.column(&column.id).is_none() {
                    self.column_index.remove(&column.id);
                }
            }
        }
        for task in &state.tasks {
            self.task_index.insert(task.id.clone(), state.board.id.clone());
        }
        for column in &state.columns {
            self.column_index
                .insert(column.id.clone(), state.board.id.clone());
        }
    }
}

#[async_trait]
impl BoardStore for MemoryStore {
    type Guard = MemoryGuard;

    async fn lock_board(&self, board_id: &BoardId, options: LockOptions) -> Result<MemoryGuard> {
        let lock = self.lock_for(board_id);
        match tokio::time::timeout(options.timeout, lock.lock_owned()).await {
            Ok(guard) => Ok(MemoryGuard {
                board_id: board_id.clone(),
                _guard: guard,
            }),
            Err(_) => Err(BoardError::LockTimeout {
                elapsed_ms: options.timeout.as_millis() as u64,
            }),
        }
    }

    async fn load(&self, board_id: &BoardId) -> Result<BoardState> {
        self.boards
            .get(board_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| BoardError::BoardNotFound {
                id: board_id.to_string(),
            })
    }

    async fn save(&self, state: &BoardState, guard: &MemoryGuard) -> Result<()> {
        if guard.board_id != state.board.id {
            return Err(BoardError::invalid_value(
                "board_id",
                format!(
                    "lock held for {} but saving {}",
                    guard.board_id, state.board.id
                ),
            ));
        }
        let previous = self.boards.insert(state.board.id.clone(), state.clone());
        self.reindex(previous.as_ref(), state);
        Ok(())
    }

    async fn insert(&self, state: &BoardState, _options: LockOptions) -> Result<()> {
        match self.boards.entry(state.board.id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                return Err(BoardError::duplicate_id("board", state.board.id.to_string()))
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(state.clone());
            }
        }
        self.reindex(None, state);
        Ok(())
    }

    async fn remove(&self, board_id: &BoardId, guard: MemoryGuard) -> Result<()> {
        if &guard.board_id != board_id {
            return Err(BoardError::invalid_value(
                "board_id",
                format!("lock held for {} but removing {}", guard.board_id, board_id),
            ));
        }
        let Some((_, state)) = self.boards.remove(board_id) else {
            return Err(BoardError::BoardNotFound {
                id: board_id.to_string(),
            });
        };
        for task in &state.tasks {
            self.task_index.remove(&task.id);
        }
        for column in &state.columns {
            self.column_index.remove(&column.id);
        }
        // waiters on the old mutex see BoardNotFound on load
        self.locks.remove(board_id);
        drop(guard);
        Ok(())
    }

    async fn locate_task(&self, task_id: &TaskId) -> Result<Option<BoardId>> {
        Ok(self.task_index.get(task_id).map(|e| e.value().clone()))
    }

    async fn locate_column(&self, column_id: &ColumnId) -> Result<Option<BoardId>> {
        Ok(self.column_index.get(column_id).map(|e| e.value().clone()))
    }

    async fn append_activity(&self, entry: &LogEntry) -> Result<()> {
        let mut activity = self
            .activity
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        activity.push(entry.clone());
        Ok(())
    }

    async fn read_activity(&self, limit: Option<usize>) -> Result<Vec<LogEntry>> {
        let activity = self
            .activity
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut entries: Vec<LogEntry> = activity.iter().rev().cloned().collect();
        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        Ok(entries)
    }
}
