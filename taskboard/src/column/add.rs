//! CreateColumn command

use crate::context::{finish, Session};
use crate::error::{BoardError, Result};
use crate::policy::Permission;
use crate::reorder;
use crate::store::BoardStore;
use crate::types::{AffectedState, BoardChange, BoardId, Column};
use crate::validate;
use serde::{Deserialize, Serialize};
use taskboard_operations::{async_trait, operation, Execute, ExecutionResult, Operation};

/// Add a column to a board
#[operation(verb = "create", noun = "column", description = "Add a new column to a board")]
#[derive(Debug, Deserialize, Serialize)]
pub struct CreateColumn {
    pub board_id: BoardId,
    pub title: String,
}

impl CreateColumn {
    pub fn new(board_id: impl Into<BoardId>, title: impl Into<String>) -> Self {
        Self {
            board_id: board_id.into(),
            title: title.into(),
        }
    }
}

#[async_trait]
impl<S: BoardStore> Execute<Session<S>, BoardError> for CreateColumn {
    type Output = AffectedState;

    async fn execute(&self, ctx: &Session<S>) -> ExecutionResult<AffectedState, BoardError> {
        let start = std::time::Instant::now();
        let input = serde_json::to_value(self).unwrap_or_default();

        let result: Result<AffectedState> = async {
            let title = validate::title("title", &self.title, ctx.config().max_title_len)?;

            let mut tx = ctx.begin(&self.board_id).await?;
            tx.authorize(Permission::Edit)?;

            let column = Column::new(&self.board_id, title);
            let column_id = column.id.clone();
            let order = reorder::insert_new(
                &column_id,
                &tx.state().column_ids(),
                ctx.config().new_item_placement,
            );

            let state = tx.state_mut();
            state.columns.push(column);
            state.apply_column_order(&order);

            let created = state
                .column_with_tasks(&column_id)
                .ok_or_else(|| BoardError::ColumnNotFound {
                    id: column_id.to_string(),
                })?;

            tx.commit_and_publish(BoardChange::ColumnCreated {
                column: created,
                column_ids: order,
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
