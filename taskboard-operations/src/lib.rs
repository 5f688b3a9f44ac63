//! # Taskboard Operations
//!
//! Operations are structs where the fields ARE the parameters. Each one names
//! itself through the [`Operation`] trait and runs through [`Execute`]
//! against a context type chosen by the engine crate.
//!
//! ## Example
//!
//! ```ignore
//! use taskboard_operations::*;
//!
//! #[operation(verb = "rename", noun = "column", description = "Rename a column")]
//! #[derive(Debug, Deserialize, Serialize)]
//! pub struct RenameColumn {
//!     pub column_id: ColumnId,
//!     pub title: String,
//! }
//!
//! #[async_trait]
//! impl<S: BoardStore> Execute<Session<S>, BoardError> for RenameColumn {
//!     type Output = BoardChange;
//!
//!     async fn execute(&self, ctx: &Session<S>) -> ExecutionResult<BoardChange, BoardError> {
//!         // returns ExecutionResult::Logged, Unlogged or Failed
//!     }
//! }
//! ```

mod execution_result;
mod log;
mod operation;
mod processor;

pub use execution_result::ExecutionResult;
pub use log::LogEntry;
pub use operation::{Execute, Operation};
pub use processor::OperationProcessor;

// Re-export proc macros
pub use taskboard_operations_macros::operation;

// Re-export for use in implementations
pub use async_trait::async_trait;
pub use serde_json::Value;
