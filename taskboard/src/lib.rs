//! Kanban ordering engine
//!
//! Boards hold ordered columns, columns hold ordered tasks, and many users
//! move them around at once. This crate keeps every sibling set at dense
//! positions `0..n` under concurrent inserts, deletes and moves, and
//! broadcasts the canonical order after each commit.
//!
//! ## Overview
//!
//! - **Ordered id lists, not position arithmetic** - every mutation computes
//!   the full resulting order of each touched parent and resequences it
//! - **One lock per board** - a mutation locks its board, reads the latest
//!   committed state, and saves the whole board atomically
//! - **Events in commit order** - each commit bumps the board version and
//!   publishes a [`BoardEvent`] whose `sequence` is that version
//! - **Client reconciliation** - [`reconciler`] applies optimistic drags and
//!   overwrites them with authoritative results
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use taskboard::{
//!     board::CreateBoard, column::CreateColumn, task::CreateTask, BoardConfig, BoardContext,
//!     Execute, MemoryStore,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let ctx = BoardContext::new(MemoryStore::new(), BoardConfig::load()?);
//! let alice = ctx.session("alice");
//!
//! let board = CreateBoard::new("Roadmap").execute(&alice).await.into_result()?;
//! let mut events = ctx.subscribe(board.id(), alice.user_id()).await?;
//!
//! CreateColumn::new(board.id(), "To Do")
//!     .execute(&alice)
//!     .await
//!     .into_result()?;
//! println!("{}", events.recv().await?.event_name()); // column.created
//! # Ok(())
//! # }
//! ```
//!
//! ## File Storage
//!
//! ```text
//! root/
//! ├── boards/
//! │   ├── {board_id}.json     # full board state
//! │   └── {board_id}.lock     # per-board advisory lock
//! └── activity/
//!     └── current.jsonl       # operation log, newest last on disk
//! ```

pub mod broadcast;
pub mod config;
mod context;
mod error;
pub mod logging;
pub mod mutation;
pub mod policy;
pub mod position;
mod processor;
pub mod reconciler;
pub mod reorder;
pub mod store;
pub mod types;
pub mod validate;

#[cfg(test)]
mod testing;

// Command modules
pub mod board;
pub mod column;
pub mod task;

// Re-export Execute trait and types from operations crate
pub use taskboard_operations::{
    async_trait, Execute, ExecutionResult, LogEntry, Operation, OperationProcessor,
};

pub use broadcast::{ChangeBroadcaster, EventPublisher, Subscription};
pub use config::{BoardConfig, Placement};
pub use context::{BoardContext, Session, Transaction};
pub use error::{BoardError, ErrorKind, Result};
pub use mutation::Mutation;
pub use processor::BoardOperationProcessor;
pub use store::{BoardStore, FileStore, LockOptions, MemoryStore};

// Re-export commonly used types
pub use types::{
    AffectedState, Board, BoardChange, BoardEvent, BoardId, BoardMembership, BoardState, ClientId,
    Column, ColumnId, ColumnWithTasks, Role, Task, TaskId, UserId,
};
