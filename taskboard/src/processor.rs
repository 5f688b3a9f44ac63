//! Board operation processor
//!
//! Runs operations, retries lock conflicts from a fresh read, and records
//! every logged outcome in the store's activity log.

use crate::context::Session;
use crate::error::{BoardError, Result};
use crate::store::BoardStore;
use taskboard_operations::{async_trait, Execute, LogEntry, OperationProcessor};

/// Processor that writes the activity trail for board operations
#[derive(Debug, Clone, Default)]
pub struct BoardOperationProcessor {
    actor: Option<String>,
}

impl BoardOperationProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `actor` on every entry instead of the session's own label
    pub fn with_actor(actor: impl Into<String>) -> Self {
        Self {
            actor: Some(actor.into()),
        }
    }
}

#[async_trait]
impl<S: BoardStore> OperationProcessor<Session<S>, BoardError> for BoardOperationProcessor {
    async fn process<T>(&self, operation: &T, ctx: &Session<S>) -> Result<T::Output>
    where
        T: Execute<Session<S>, BoardError> + Send + Sync,
    {
        let max_retries = ctx.config().max_conflict_retries;
        let mut attempt = 0;

        let (result, log_entry) = loop {
            let (result, log_entry) = operation.execute(ctx).await.split();
            let conflict = result
                .as_ref()
                .err()
                .filter(|error| error.is_retryable() && attempt < max_retries)
                .map(|error| error.to_string());
            let Some(conflict) = conflict else {
                break (result, log_entry);
            };
            attempt += 1;
            tracing::warn!(
                op = %operation.op_string(),
                attempt,
                max_retries,
                error = %conflict,
                "conflict, retrying"
            );
            tokio::time::sleep(ctx.config().lock_retry_interval() * attempt).await;
        };

        if let Some(entry) = log_entry {
            let actor = self.actor.clone().unwrap_or_else(|| ctx.actor_label());
            let mut entry = entry.with_actor(actor);
            if let Ok(output) = &result {
                entry = entry.with_affected(operation.affected_resources(output));
            }
            // a lost log entry does not undo a commit
            if let Err(error) = self.write_log(ctx, &entry).await {
                tracing::warn!(op = %entry.op, %error, "failed to record activity");
            }
        }

        result
    }

    async fn write_log(&self, ctx: &Session<S>, log_entry: &LogEntry) -> Result<()> {
        ctx.store().append_activity(log_entry).await
    }
}
