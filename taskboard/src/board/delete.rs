//! DeleteBoard command

use crate::context::{finish, Session};
use crate::error::{BoardError, Result};
use crate::policy::Permission;
use crate::store::BoardStore;
use crate::types::BoardId;
use serde::{Deserialize, Serialize};
use taskboard_operations::{async_trait, operation, Execute, ExecutionResult, Operation};

/// Delete a board with all of its columns and tasks.
///
/// Subscribers of the board see their subscription end.
#[operation(verb = "delete", noun = "board", description = "Delete a board and everything on it")]
#[derive(Debug, Deserialize, Serialize)]
pub struct DeleteBoard {
    pub board_id: BoardId,
}

impl DeleteBoard {
    pub fn new(board_id: impl Into<BoardId>) -> Self {
        Self {
            board_id: board_id.into(),
        }
    }
}

#[async_trait]
impl<S: BoardStore> Execute<Session<S>, BoardError> for DeleteBoard {
    type Output = BoardId;

    async fn execute(&self, ctx: &Session<S>) -> ExecutionResult<BoardId, BoardError> {
        let start = std::time::Instant::now();
        let input = serde_json::to_value(self).unwrap_or_default();

        let result: Result<BoardId> = async {
            let tx = ctx.begin(&self.board_id).await?;
            tx.authorize(Permission::Administer)?;
            let removed = tx.remove().await?;
            tracing::debug!(
                board_id = %self.board_id,
                columns = removed.columns.len(),
                tasks = removed.tasks.len(),
                "board contents removed"
            );
            Ok(self.board_id.clone())
        }
        .await;

        finish(self.op_string(), input, start, result)
    }

    fn affected_resources(&self, output: &BoardId) -> Vec<String> {
        vec![output.to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::CreateTask;
    use crate::testing;

    #[tokio::test]
    async fn test_delete_board() {
        let (ctx, board_id, c) = testing::board(&["A", "B"]).await;
        let t = testing::tasks(&ctx, &c[0], &["x"]).await;
        let owner = ctx.session("owner");
        let mut events = ctx.subscribe(&board_id, owner.user_id()).await.unwrap();

        DeleteBoard::new(&board_id)
            .execute(&owner)
            .await
            .into_result()
            .unwrap();

        let err = ctx.store().load(&board_id).await.unwrap_err();
        assert!(matches!(err, BoardError::BoardNotFound { .. }));
        assert_eq!(ctx.store().locate_task(&t[0]).await.unwrap(), None);
        assert_eq!(ctx.store().locate_column(&c[1]).await.unwrap(), None);
        assert!(matches!(
            events.recv().await,
            Err(BoardError::SubscriptionClosed { .. })
        ));
        assert_eq!(ctx.broadcaster().subscriber_count(&board_id), 0);

        // commands against the deleted board need a refetch
        let err = CreateTask::new(&c[0], "late")
            .execute(&owner)
            .await
            .into_result()
            .unwrap_err();
        assert!(err.requires_refetch());
    }

    #[tokio::test]
    async fn test_only_admins_delete() {
        let (ctx, board_id, _) = testing::board(&["A"]).await;
        for user in ["ed", "vi", "stranger"] {
            let err = DeleteBoard::new(&board_id)
                .execute(&ctx.session(user))
                .await
                .into_result()
                .unwrap_err();
            assert!(matches!(err, BoardError::Unauthorized { .. }));
        }
        assert!(ctx.store().load(&board_id).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_missing_board() {
        let (ctx, _, _) = testing::board(&[]).await;
        let err = DeleteBoard::new("missing")
            .execute(&ctx.session("owner"))
            .await
            .into_result()
            .unwrap_err();
        assert!(err.requires_refetch());
    }
}
