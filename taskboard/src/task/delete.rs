//! DeleteTask command

use crate::context::{finish, Session};
use crate::error::{BoardError, Result};
use crate::policy::Permission;
use crate::position;
use crate::reorder;
use crate::store::BoardStore;
use crate::types::{AffectedState, BoardChange, TaskId};
use serde::{Deserialize, Serialize};
use taskboard_operations::{async_trait, operation, Execute, ExecutionResult, Operation};

/// Delete a task and close the gap it leaves
#[operation(verb = "delete", noun = "task", description = "Delete a task")]
#[derive(Debug, Deserialize, Serialize)]
pub struct DeleteTask {
    pub task_id: TaskId,
}

impl DeleteTask {
    pub fn new(task_id: impl Into<TaskId>) -> Self {
        Self {
            task_id: task_id.into(),
        }
    }
}

#[async_trait]
impl<S: BoardStore> Execute<Session<S>, BoardError> for DeleteTask {
    type Output = AffectedState;

    async fn execute(&self, ctx: &Session<S>) -> ExecutionResult<AffectedState, BoardError> {
        let start = std::time::Instant::now();
        let input = serde_json::to_value(self).unwrap_or_default();

        let result: Result<AffectedState> = async {
            let board_id = ctx.locate_task(&self.task_id).await?;
            let mut tx = ctx.begin(&board_id).await?;
            tx.authorize(Permission::Edit)?;

            let (column_id, deleted_position) = tx
                .state()
                .task(&self.task_id)
                .map(|t| (t.column_id.clone(), t.position))
                .ok_or_else(|| BoardError::TaskNotFound {
                    id: self.task_id.to_string(),
                })?;

            let state = tx.state_mut();
            state.tasks.retain(|t| t.id != self.task_id);

            let remaining: Vec<(TaskId, usize)> = state
                .tasks
                .iter()
                .filter(|t| t.column_id == column_id)
                .map(|t| (t.id.clone(), t.position))
                .collect();
            let positions = reorder::close_gap_on_delete(deleted_position, &remaining);
            position::apply_sequence(
                state.tasks.iter_mut().filter(|t| t.column_id == column_id),
                &positions,
            );

            tx.commit_and_publish(BoardChange::TaskDeleted {
                task_id: self.task_id.clone(),
                column_id,
                task_ids: positions.into_keys().collect(),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::CreateTask;
    use crate::testing;

    #[tokio::test]
    async fn test_delete_closes_gap() {
        let (ctx, board_id, c) = testing::board(&["To Do"]).await;
        let ids = testing::tasks(&ctx, &c[0], &["A", "B", "C", "D"]).await;

        let affected = DeleteTask::new(&ids[1])
            .execute(&ctx.session("ed"))
            .await
            .into_result()
            .unwrap();

        assert_eq!(
            affected.change,
            BoardChange::TaskDeleted {
                task_id: ids[1].clone(),
                column_id: c[0].clone(),
                task_ids: vec![ids[0].clone(), ids[2].clone(), ids[3].clone()],
            }
        );
        let state = ctx.store().load(&board_id).await.unwrap();
        state.check_density().unwrap();
        assert_eq!(state.task(&ids[3]).unwrap().position, 2);
    }

    #[tokio::test]
    async fn test_delete_last_then_append_reuses_position() {
        let (ctx, _, c) = testing::board(&["To Do"]).await;
        let ids = testing::tasks(&ctx, &c[0], &["A", "B", "C"]).await;
        let owner = ctx.session("owner");

        DeleteTask::new(&ids[2])
            .execute(&owner)
            .await
            .into_result()
            .unwrap();
        let affected = CreateTask::new(&c[0], "D")
            .execute(&owner)
            .await
            .into_result()
            .unwrap();

        let BoardChange::TaskCreated { task, .. } = affected.change else {
            panic!("expected task.created");
        };
        assert_eq!(task.position, 2);
    }

    #[tokio::test]
    async fn test_delete_missing_task() {
        let (ctx, _, _) = testing::board(&["To Do"]).await;
        let err = DeleteTask::new("gone")
            .execute(&ctx.session("owner"))
            .await
            .into_result()
            .unwrap_err();
        assert!(matches!(err, BoardError::TaskNotFound { .. }));
    }
}
