//! RemoveMember command

use crate::context::{finish, Session};
use crate::error::{BoardError, Result};
use crate::policy::Permission;
use crate::store::BoardStore;
use crate::types::{BoardId, BoardMembership, UserId};
use serde::{Deserialize, Serialize};
use taskboard_operations::{async_trait, operation, Execute, ExecutionResult, Operation};

/// Take a user off a board. Members cannot remove themselves.
#[operation(verb = "remove", noun = "member", description = "Remove a member from a board")]
#[derive(Debug, Deserialize, Serialize)]
pub struct RemoveMember {
    pub board_id: BoardId,
    pub user_id: UserId,
}

impl RemoveMember {
    pub fn new(board_id: impl Into<BoardId>, user_id: impl Into<UserId>) -> Self {
        Self {
            board_id: board_id.into(),
            user_id: user_id.into(),
        }
    }
}

#[async_trait]
impl<S: BoardStore> Execute<Session<S>, BoardError> for RemoveMember {
    type Output = BoardMembership;

    async fn execute(&self, ctx: &Session<S>) -> ExecutionResult<BoardMembership, BoardError> {
        let start = std::time::Instant::now();
        let input = serde_json::to_value(self).unwrap_or_default();

        let result: Result<BoardMembership> = async {
            if &self.user_id == ctx.user_id() {
                return Err(BoardError::invalid_value(
                    "user_id",
                    "you cannot remove yourself from the board",
                ));
            }

            let mut tx = ctx.begin(&self.board_id).await?;
            tx.authorize(Permission::Administer)?;

            if tx.state().board.owner_id == self.user_id {
                return Err(BoardError::invalid_value(
                    "user_id",
                    "the board owner cannot be removed",
                ));
            }

            let members = &mut tx.state_mut().members;
            let Some(index) = members.iter().position(|m| m.user_id == self.user_id) else {
                return Err(BoardError::invalid_value(
                    "user_id",
                    format!("{} is not a member of the board", self.user_id),
                ));
            };
            let removed = members.remove(index);

            tx.commit().await?;
            tracing::info!(board_id = %self.board_id, user = %self.user_id, "member removed");
            Ok(removed)
        }
        .await;

        finish(self.op_string(), input, start, result)
    }

    fn affected_resources(&self, output: &BoardMembership) -> Vec<String> {
        vec![output.board_id.to_string(), output.user_id.to_string()]
    }
}
