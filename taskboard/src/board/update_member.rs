//! UpdateMemberRole command

use crate::context::{finish, Session};
use crate::error::{BoardError, Result};
use crate::policy::Permission;
use crate::store::BoardStore;
use crate::types::{BoardId, BoardMembership, Role, UserId};
use serde::{Deserialize, Serialize};
use taskboard_operations::{async_trait, operation, Execute, ExecutionResult, Operation};

/// Change the role of an existing member to editor or viewer
#[operation(verb = "update", noun = "member", description = "Change a board member's role")]
#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateMemberRole {
    pub board_id: BoardId,
    pub user_id: UserId,
    pub role: Role,
}

impl UpdateMemberRole {
    pub fn new(board_id: impl Into<BoardId>, user_id: impl Into<UserId>, role: Role) -> Self {
        Self {
            board_id: board_id.into(),
            user_id: user_id.into(),
            role,
        }
    }
}

#[async_trait]
impl<S: BoardStore> Execute<Session<S>, BoardError> for UpdateMemberRole {
    type Output = BoardMembership;

    async fn execute(&self, ctx: &Session<S>) -> ExecutionResult<BoardMembership, BoardError> {
        let start = std::time::Instant::now();
        let input = serde_json::to_value(self).unwrap_or_default();

        let result: Result<BoardMembership> = async {
            if self.role == Role::Admin {
                return Err(BoardError::invalid_value(
                    "role",
                    "must be editor or viewer",
                ));
            }

            let mut tx = ctx.begin(&self.board_id).await?;
            tx.authorize(Permission::Administer)?;

            if tx.state().board.owner_id == self.user_id {
                return Err(BoardError::invalid_value(
                    "user_id",
                    "the board owner's role cannot be changed",
                ));
            }

            let Some(member) = tx
                .state_mut()
                .members
                .iter_mut()
                .find(|m| m.user_id == self.user_id)
            else {
                return Err(BoardError::invalid_value(
                    "user_id",
                    format!("{} is not a member of the board", self.user_id),
                ));
            };
            member.role = self.role;
            let membership = member.clone();

            tx.commit().await?;
            Ok(membership)
        }
        .await;

        finish(self.op_string(), input, start, result)
    }

    fn affected_resources(&self, output: &BoardMembership) -> Vec<String> {
        vec![output.board_id.to_string(), output.user_id.to_string()]
    }
}
