//! RenameTask command

use crate::context::{finish, Session};
use crate::error::{BoardError, Result};
use crate::policy::Permission;
use crate::store::BoardStore;
use crate::types::{AffectedState, BoardChange, TaskId, UserId};
use crate::validate;
use serde::{Deserialize, Serialize};
use taskboard_operations::{async_trait, operation, Execute, ExecutionResult, Operation};

/// Edit a task's title, description or assignee; its position is untouched
#[operation(verb = "rename", noun = "task", description = "Update a task's title and details")]
#[derive(Debug, Deserialize, Serialize)]
pub struct RenameTask {
    pub task_id: TaskId,
    pub title: String,
    /// Replaces the description when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Replaces the assignee when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<UserId>,
    /// Clear the assignee
    #[serde(default)]
    pub unassign: bool,
}

impl RenameTask {
    pub fn new(task_id: impl Into<TaskId>, title: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            title: title.into(),
            description: None,
            assignee_id: None,
            unassign: false,
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

    pub fn unassigned(mut self) -> Self {
        self.unassign = true;
        self
    }
}

#[async_trait]
impl<S: BoardStore> Execute<Session<S>, BoardError> for RenameTask {
    type Output = AffectedState;

    async fn execute(&self, ctx: &Session<S>) -> ExecutionResult<AffectedState, BoardError> {
        let start = std::time::Instant::now();
        let input = serde_json::to_value(self).unwrap_or_default();

        let result: Result<AffectedState> = async {
            let title = validate::title("title", &self.title, ctx.config().max_title_len)?;
            let board_id = ctx.locate_task(&self.task_id).await?;
            let mut tx = ctx.begin(&board_id).await?;
            tx.authorize(Permission::Edit)?;
            validate::assignee(tx.state(), self.assignee_id.as_ref())?;

            let task = tx
                .state_mut()
                .task_mut(&self.task_id)
                .ok_or_else(|| BoardError::TaskNotFound {
                    id: self.task_id.to_string(),
                })?;
            task.title = title;
            if let Some(description) = &self.description {
                task.description = description.clone();
            }
            if self.unassign {
                task.assignee_id = None;
            } else if let Some(assignee) = &self.assignee_id {
                task.assignee_id = Some(assignee.clone());
            }
            let task = task.clone();

            tx.commit_and_publish(BoardChange::TaskUpdated { task })
                .await
        }
        .await;

        finish(self.op_string(), input, start, result)
    }

    fn affected_resources(&self, output: &AffectedState) -> Vec<String> {
        output.change.affected_ids()
    }
}
