//! MoveColumn command

use crate::context::{finish, Session};
use crate::error::{BoardError, Result};
use crate::policy::Permission;
use crate::reorder;
use crate::store::BoardStore;
use crate::types::{AffectedState, BoardChange, ColumnId};
use serde::{Deserialize, Serialize};
use taskboard_operations::{async_trait, operation, Execute, ExecutionResult, Operation};

/// Move a column to another index of its board
#[operation(verb = "move", noun = "column", description = "Reorder a column within its board")]
#[derive(Debug, Deserialize, Serialize)]
pub struct MoveColumn {
    pub column_id: ColumnId,
    /// Zero-based target index, clamped to the number of columns
    pub destination_index: usize,
}

impl MoveColumn {
    pub fn new(column_id: impl Into<ColumnId>, destination_index: usize) -> Self {
        Self {
            column_id: column_id.into(),
            destination_index,
        }
    }
}

#[async_trait]
impl<S: BoardStore> Execute<Session<S>, BoardError> for MoveColumn {
    type Output = AffectedState;

    async fn execute(&self, ctx: &Session<S>) -> ExecutionResult<AffectedState, BoardError> {
        let start = std::time::Instant::now();
        let input = serde_json::to_value(self).unwrap_or_default();

        let result: Result<AffectedState> = async {
            let board_id = ctx.locate_column(&self.column_id).await?;
            let mut tx = ctx.begin(&board_id).await?;
            tx.authorize(Permission::Edit)?;

            if tx.state().column(&self.column_id).is_none() {
                return Err(BoardError::ColumnNotFound {
                    id: self.column_id.to_string(),
                });
            }

            let order = reorder::move_within_parent(
                &self.column_id,
                &tx.state().column_ids(),
                self.destination_index,
            );
            let changed = tx.state_mut().apply_column_order(&order);
            tracing::debug!(column_id = %self.column_id, changed, "column reordered");

            tx.commit_and_publish(BoardChange::ColumnMoved {
                board_id,
                column_ids: order,
            })
            .await
        }
        .await;

        finish(self.op_string(), input, start, result)
    }

    fn affected_resources(&self, output: &AffectedState) -> Vec<String> {
        vec![output.board_id.to_string(), self.column_id.to_string()]
    }
}
