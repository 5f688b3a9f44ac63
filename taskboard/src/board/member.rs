//! AddMember command

use crate::context::{finish, Session};
use crate::error::{BoardError, Result};
use crate::policy::Permission;
use crate::store::BoardStore;
use crate::types::{BoardId, BoardMembership, Role, UserId};
use serde::{Deserialize, Serialize};
use taskboard_operations::{async_trait, operation, Execute, ExecutionResult, Operation};

/// Grant a user a role on a board, replacing any role they already hold
#[operation(verb = "add", noun = "member", description = "Add a member to a board")]
#[derive(Debug, Deserialize, Serialize)]
pub struct AddMember {
    pub board_id: BoardId,
    pub user_id: UserId,
    pub role: Role,
}

impl AddMember {
    pub fn new(board_id: impl Into<BoardId>, user_id: impl Into<UserId>, role: Role) -> Self {
        Self {
            board_id: board_id.into(),
            user_id: user_id.into(),
            role,
        }
    }
}

#[async_trait]
impl<S: BoardStore> Execute<Session<S>, BoardError> for AddMember {
    type Output = BoardMembership;

    async fn execute(&self, ctx: &Session<S>) -> ExecutionResult<BoardMembership, BoardError> {
        let start = std::time::Instant::now();
        let input = serde_json::to_value(self).unwrap_or_default();

        let result: Result<BoardMembership> = async {
            let mut tx = ctx.begin(&self.board_id).await?;
            tx.authorize(Permission::Administer)?;

            if tx.state().board.owner_id == self.user_id {
                return Err(BoardError::invalid_value(
                    "user_id",
                    "the board owner's role cannot be changed",
                ));
            }

            let membership = BoardMembership {
                board_id: self.board_id.clone(),
                user_id: self.user_id.clone(),
                role: self.role,
            };
            let members = &mut tx.state_mut().members;
            match members.iter_mut().find(|m| m.user_id == self.user_id) {
                Some(existing) => existing.role = self.role,
                None => members.push(membership.clone()),
            }

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
