//! Core types for the board engine

mod board;
mod change;
mod ids;
mod state;
mod task;

// Re-export all types
pub use board::{Board, BoardMembership, Column, ColumnWithTasks, Role};
pub use change::{AffectedState, BoardChange, BoardEvent, ParentOrder};
pub use ids::{BoardId, ClientId, ColumnId, TaskId, UserId};
pub use state::BoardState;
pub use task::Task;
