//! RenameColumn command

use crate::context::{finish, Session};
use crate::error::{BoardError, Result};
use crate::policy::Permission;
use crate::store::BoardStore;
use crate::types::{AffectedState, BoardChange, ColumnId};
use crate::validate;
use serde::{Deserialize, Serialize};
use taskboard_operations::{async_trait, operation, Execute, ExecutionResult, Operation};

/// Change a column's title; positions are untouched
#[operation(verb = "rename", noun = "column", description = "Rename a column")]
#[derive(Debug, Deserialize, Serialize)]
pub struct RenameColumn {
    pub column_id: ColumnId,
    pub title: String,
}

impl RenameColumn {
    pub fn new(column_id: impl Into<ColumnId>, title: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            title: title.into(),
        }
    }
}

#[async_trait]
impl<S: BoardStore> Execute<Session<S>, BoardError> for RenameColumn {
    type Output = AffectedState;

    async fn execute(&self, ctx: &Session<S>) -> ExecutionResult<AffectedState, BoardError> {
        let start = std::time::Instant::now();
        let input = serde_json::to_value(self).unwrap_or_default();

        let result: Result<AffectedState> = async {
            let title = validate::title("title", &self.title, ctx.config().max_title_len)?;
            let board_id = ctx.locate_column(&self.column_id).await?;
            let mut tx = ctx.begin(&board_id).await?;
            tx.authorize(Permission::Edit)?;

            let column = tx
                .state_mut()
                .column_mut(&self.column_id)
                .ok_or_else(|| BoardError::ColumnNotFound {
                    id: self.column_id.to_string(),
                })?;
            column.title = title;
            let column = column.clone();

            tx.commit_and_publish(BoardChange::ColumnUpdated { column })
                .await
        }
        .await;

        finish(self.op_string(), input, start, result)
    }

    fn affected_resources(&self, output: &AffectedState) -> Vec<String> {
        output.change.affected_ids()
    }
}
