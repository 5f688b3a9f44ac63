//! DeleteColumn command

use crate::context::{finish, Session};
use crate::error::{BoardError, Result};
use crate::policy::Permission;
use crate::position;
use crate::reorder;
use crate::store::BoardStore;
use crate::types::{AffectedState, BoardChange, ColumnId, TaskId};
use serde::{Deserialize, Serialize};
use taskboard_operations::{async_trait, operation, Execute, ExecutionResult, Operation};

/// Delete a column together with its tasks
#[operation(verb = "delete", noun = "column", description = "Delete a column and its tasks")]
#[derive(Debug, Deserialize, Serialize)]
pub struct DeleteColumn {
    pub column_id: ColumnId,
}

impl DeleteColumn {
    pub fn new(column_id: impl Into<ColumnId>) -> Self {
        Self {
            column_id: column_id.into(),
        }
    }
}

#[async_trait]
impl<S: BoardStore> Execute<Session<S>, BoardError> for DeleteColumn {
    type Output = AffectedState;

    async fn execute(&self, ctx: &Session<S>) -> ExecutionResult<AffectedState, BoardError> {
        let start = std::time::Instant::now();
        let input = serde_json::to_value(self).unwrap_or_default();

        let result: Result<AffectedState> = async {
            let board_id = ctx.locate_column(&self.column_id).await?;
            let mut tx = ctx.begin(&board_id).await?;
            tx.authorize(Permission::Edit)?;

            let deleted_position = tx
                .state()
                .column(&self.column_id)
                .map(|c| c.position)
                .ok_or_else(|| BoardError::ColumnNotFound {
                    id: self.column_id.to_string(),
                })?;

            let state = tx.state_mut();

            // cascade inside the same transaction
            let task_ids: Vec<TaskId> = state.task_ids_in(&self.column_id);
            state.tasks.retain(|t| t.column_id != self.column_id);
            state.columns.retain(|c| c.id != self.column_id);

            let remaining: Vec<(ColumnId, usize)> = state
                .columns
                .iter()
                .map(|c| (c.id.clone(), c.position))
                .collect();
            let positions = reorder::close_gap_on_delete(deleted_position, &remaining);
            position::apply_sequence(state.columns.iter_mut(), &positions);

            tracing::debug!(
                column_id = %self.column_id,
                cascaded = task_ids.len(),
                "column deleted"
            );

            tx.commit_and_publish(BoardChange::ColumnDeleted {
                column_id: self.column_id.clone(),
                column_ids: positions.into_keys().collect(),
                task_ids,
            })
            .await
        }
        .await;

        finish(self.op_string(), input, start, result)
    }

    fn affected_resources(&self, output: &AffectedState) -> Vec<String> {
        output.change.affected_ids()
    }
}
