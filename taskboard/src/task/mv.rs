//! MoveTask command

use crate::context::{finish, Session};
use crate::error::{BoardError, Result};
use crate::policy::Permission;
use crate::reorder;
use crate::store::BoardStore;
use crate::types::{AffectedState, BoardChange, ColumnId, TaskId};
use crate::validate;
use serde::{Deserialize, Serialize};
use taskboard_operations::{async_trait, operation, Execute, ExecutionResult, Operation};

/// Move a task within its column or into another column of the same board
///
/// `ordered_task_ids` is the full order of the destination column as the
/// client saw it after the drop, moved task included.
#[operation(verb = "move", noun = "task", description = "Move a task to a column and position")]
#[derive(Debug, Deserialize, Serialize)]
pub struct MoveTask {
    pub task_id: TaskId,
    pub destination_column_id: ColumnId,
    pub ordered_task_ids: Vec<TaskId>,
}

impl MoveTask {
    pub fn new(
        task_id: impl Into<TaskId>,
        destination_column_id: impl Into<ColumnId>,
        ordered_task_ids: Vec<TaskId>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            destination_column_id: destination_column_id.into(),
            ordered_task_ids,
        }
    }
}

#[async_trait]
impl<S: BoardStore> Execute<Session<S>, BoardError> for MoveTask {
    type Output = AffectedState;

    async fn execute(&self, ctx: &Session<S>) -> ExecutionResult<AffectedState, BoardError> {
        let start = std::time::Instant::now();
        let input = serde_json::to_value(self).unwrap_or_default();

        let result: Result<AffectedState> = async {
            let board_id = ctx.locate_task(&self.task_id).await?;
            let mut tx = ctx.begin(&board_id).await?;
            tx.authorize(Permission::Edit)?;

            let task = tx
                .state()
                .task(&self.task_id)
                .cloned()
                .ok_or_else(|| BoardError::TaskNotFound {
                    id: self.task_id.to_string(),
                })?;

            let destination = &self.destination_column_id;
            if tx.state().column(destination).is_none() {
                return Err(match ctx.store().locate_column(destination).await? {
                    Some(other) => BoardError::invalid_value(
                        "destination_column_id",
                        format!("column {} belongs to board {}, not {}", destination, other, board_id),
                    ),
                    None => BoardError::ColumnNotFound {
                        id: destination.to_string(),
                    },
                });
            }

            validate::ordering(&self.ordered_task_ids, |id| tx.state().task(id).is_some())?;
            let merged = reorder::merge_requested_order(
                &self.task_id,
                &tx.state().task_ids_in(destination),
                &self.ordered_task_ids,
            )?;
            let target_index = merged
                .iter()
                .position(|id| id == &self.task_id)
                .unwrap_or(merged.len());
            let others: Vec<TaskId> = merged
                .into_iter()
                .filter(|id| id != &self.task_id)
                .collect();

            let source = task.column_id.clone();
            let change = if &source == destination {
                let order = reorder::move_within_parent(&self.task_id, &others, target_index);
                let state = tx.state_mut();
                state.apply_task_order(destination, &order);
                let moved = state.task(&self.task_id).cloned().unwrap_or(task);
                BoardChange::TaskMoved {
                    task: moved,
                    from_column_id: source,
                    to_column_id: destination.clone(),
                    from_task_ids: order.clone(),
                    to_task_ids: order,
                }
            } else {
                let source_order = tx.state().task_ids_in(&source);
                let outcome = reorder::move_across_parents(
                    &task,
                    destination.clone(),
                    &source_order,
                    &others,
                    target_index,
                );
                let state = tx.state_mut();
                if let Some(stored) = state.task_mut(&self.task_id) {
                    *stored = outcome.entity.clone();
                }
                state.apply_task_order(&source, &outcome.source);
                state.apply_task_order(destination, &outcome.destination);
                BoardChange::TaskMoved {
                    task: outcome.entity,
                    from_column_id: source,
                    to_column_id: destination.clone(),
                    from_task_ids: outcome.source,
                    to_task_ids: outcome.destination,
                }
            };

            tracing::debug!(
                task_id = %self.task_id,
                to = %destination,
                index = target_index,
                "task moved"
            );
            tx.commit_and_publish(change).await
        }
        .await;

        finish(self.op_string(), input, start, result)
    }

    fn affected_resources(&self, output: &AffectedState) -> Vec<String> {
        match &output.change {
            BoardChange::TaskMoved {
                task,
                from_column_id,
                to_column_id,
                ..
            } => vec![
                task.id.to_string(),
                from_column_id.to_string(),
                to_column_id.to_string(),
            ],
            other => other.affected_ids(),
        }
    }
}
