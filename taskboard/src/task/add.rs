//! CreateTask command

use crate::context::{finish, Session};
use crate::error::{BoardError, Result};
use crate::policy::Permission;
use crate::reorder;
use crate::store::BoardStore;
use crate::types::{AffectedState, BoardChange, ColumnId, Task, UserId};
use crate::validate;
use serde::{Deserialize, Serialize};
use taskboard_operations::{async_trait, operation, Execute, ExecutionResult, Operation};

/// Create a task in a column
#[operation(verb = "create", noun = "task", description = "Create a new task in a column")]
#[derive(Debug, Deserialize, Serialize)]
pub struct CreateTask {
    pub column_id: ColumnId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<UserId>,
}

impl CreateTask {
    pub fn new(column_id: impl Into<ColumnId>, title: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            title: title.into(),
            description: None,
            assignee_id: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_assignee(mut self, assignee: impl Into<UserId>) -> Self {
        self.assignee_id = Some(assignee.into());
        self
    }
}

#[async_trait]
impl<S: BoardStore> Execute<Session<S>, BoardError> for CreateTask {
    type Output = AffectedState;

    async fn execute(&self, ctx: &Session<S>) -> ExecutionResult<AffectedState, BoardError> {
        let start = std::time::Instant::now();
        let input = serde_json::to_value(self).unwrap_or_default();

        let result: Result<AffectedState> = async {
            let title = validate::title("title", &self.title, ctx.config().max_title_len)?;
            let board_id = ctx.locate_column(&self.column_id).await?;
            let mut tx = ctx.begin(&board_id).await?;
            tx.authorize(Permission::Edit)?;

            if tx.state().column(&self.column_id).is_none() {
                return Err(BoardError::ColumnNotFound {
                    id: self.column_id.to_string(),
                });
            }
            validate::assignee(tx.state(), self.assignee_id.as_ref())?;

            let task = Task::new(&self.column_id, ctx.user_id(), title)
                .with_description(self.description.clone().unwrap_or_default())
                .with_assignee(self.assignee_id.clone());
            let task_id = task.id.clone();

            let order = reorder::insert_new(
                &task_id,
                &tx.state().task_ids_in(&self.column_id),
                ctx.config().new_item_placement,
            );
            let state = tx.state_mut();
            state.tasks.push(task);
            state.apply_task_order(&self.column_id, &order);

            let task = state
                .task(&task_id)
                .cloned()
                .ok_or_else(|| BoardError::TaskNotFound {
                    id: task_id.to_string(),
                })?;

            tx.commit_and_publish(BoardChange::TaskCreated {
                task,
                task_ids: order,
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
    use crate::config::{BoardConfig, Placement};
    use crate::testing;

    #[tokio::test]
    async fn test_tasks_append_at_end() {
        let (ctx, board_id, c) = testing::board(&["To Do"]).await;
        let ids = testing::tasks(&ctx, &c[0], &["A", "B"]).await;

        let affected = CreateTask::new(&c[0], "C")
            .with_description("third")
            .execute(&ctx.session("ed"))
            .await
            .into_result()
            .unwrap();

        let BoardChange::TaskCreated { task, task_ids } = affected.change else {
            panic!("expected task.created");
        };
        assert_eq!(task.position, 2);
        assert_eq!(task.creator_id.as_str(), "ed");
        assert_eq!(task.description, "third");
        assert_eq!(task_ids, vec![ids[0].clone(), ids[1].clone(), task.id.clone()]);
        assert_eq!(
            testing::titles(&ctx, &board_id, &c[0]).await,
            vec!["A", "B", "C"]
        );
    }

    #[tokio::test]
    async fn test_start_placement_shifts_siblings() {
        let config = BoardConfig::default().with_placement(Placement::Start);
        let (ctx, board_id, c) = testing::board_with_config(config, &["To Do"]).await;
        testing::tasks(&ctx, &c[0], &["A", "B", "C"]).await;

        assert_eq!(
            testing::titles(&ctx, &board_id, &c[0]).await,
            vec!["C", "B", "A"]
        );
        ctx.store()
            .load(&board_id)
            .await
            .unwrap()
            .check_density()
            .unwrap();
    }

    #[tokio::test]
    async fn test_assignee_must_be_member() {
        let (ctx, _, c) = testing::board(&["To Do"]).await;

        let ok = CreateTask::new(&c[0], "Mine")
            .with_assignee("vi")
            .execute(&ctx.session("owner"))
            .await
            .into_result()
            .unwrap();
        let BoardChange::TaskCreated { task, .. } = ok.change else {
            panic!("expected task.created");
        };
        assert_eq!(task.assignee_id, Some(UserId::from("vi")));

        let err = CreateTask::new(&c[0], "Theirs")
            .with_assignee("stranger")
            .execute(&ctx.session("owner"))
            .await
            .into_result()
            .unwrap_err();
        assert!(matches!(err, BoardError::InvalidValue { .. }));
    }

    #[tokio::test]
    async fn test_title_too_long() {
        let (ctx, board_id, c) = testing::board(&["To Do"]).await;
        let err = CreateTask::new(&c[0], "x".repeat(256))
            .execute(&ctx.session("owner"))
            .await
            .into_result()
            .unwrap_err();
        assert!(matches!(err, BoardError::InvalidValue { .. }));
        assert!(ctx.store().load(&board_id).await.unwrap().tasks.is_empty());
    }
}
