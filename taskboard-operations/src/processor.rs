//! Operation processors
//!
//! A processor runs an operation and persists its log entry. Engines decide
//! where logs go and whether anything wraps execution (retries, actors).

use crate::{Execute, LogEntry};
use async_trait::async_trait;

/// Runs operations against a context and records their audit entries
#[async_trait]
pub trait OperationProcessor<C, E>: Send + Sync
where
    C: Send + Sync,
    E: Send,
{
    /// Execute the operation, write its log entry if any, return the value
    async fn process<T>(&self, operation: &T, ctx: &C) -> Result<T::Output, E>
    where
        T: Execute<C, E> + Send + Sync;

    /// Persist a log entry
    async fn write_log(&self, ctx: &C, log_entry: &LogEntry) -> Result<(), E>;
}
