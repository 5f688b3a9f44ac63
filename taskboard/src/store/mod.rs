//! Transactional board storage
//!
//! The store is a key-value collaborator: key = board id, value = the whole
//! [`BoardState`]. A mutation takes the board's exclusive lock, loads the
//! state, and saves the complete new state while still holding the lock.
//! Readers that do not lock only ever see fully committed states.

mod file;
mod memory;

pub use file::{FileLock, FileStore};
pub use memory::MemoryStore;

use crate::config::BoardConfig;
use crate::error::Result;
use crate::types::{BoardId, BoardState, ColumnId, TaskId};
use async_trait::async_trait;
use std::time::Duration;
use taskboard_operations::LogEntry;

/// How long to wait for a board lock and how often to poll for it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockOptions {
    pub timeout: Duration,
    pub retry_interval: Duration,
}

impl From<&BoardConfig> for LockOptions {
    fn from(config: &BoardConfig) -> Self {
        Self {
            timeout: config.lock_timeout(),
            retry_interval: config.lock_retry_interval(),
        }
    }
}

/// Storage backend for boards
#[async_trait]
pub trait BoardStore: Send + Sync + 'static {
    /// Proof that the board lock is held; releases on drop
    type Guard: Send + Sync;

    /// Acquire the exclusive lock of a board, failing with a lock timeout
    async fn lock_board(&self, board_id: &BoardId, options: LockOptions) -> Result<Self::Guard>;

    /// Read the latest committed state of a board
    async fn load(&self, board_id: &BoardId) -> Result<BoardState>;

    /// Atomically replace the state of a locked board
    async fn save(&self, state: &BoardState, guard: &Self::Guard) -> Result<()>;

    /// Store a new board; fails if the id already exists
    async fn insert(&self, state: &BoardState, options: LockOptions) -> Result<()>;

    /// Delete a locked board together with its lock and index entries
    async fn remove(&self, board_id: &BoardId, guard: Self::Guard) -> Result<()>;

    /// Board that currently holds a task
    async fn locate_task(&self, task_id: &TaskId) -> Result<Option<BoardId>>;

    /// Board that currently holds a column
    async fn locate_column(&self, column_id: &ColumnId) -> Result<Option<BoardId>>;

    /// Append an entry to the activity log
    async fn append_activity(&self, entry: &LogEntry) -> Result<()>;

    /// Activity log entries, newest first
    async fn read_activity(&self, limit: Option<usize>) -> Result<Vec<LogEntry>>;
}
