//! GetBoard command

use crate::context::Session;
use crate::error::BoardError;
use crate::store::BoardStore;
use crate::types::{BoardId, BoardState};
use serde::{Deserialize, Serialize};
use taskboard_operations::{async_trait, operation, Execute, ExecutionResult};

/// Read the authoritative state of a board, used by clients to resync
#[operation(verb = "get", noun = "board", description = "Retrieve a board with its columns and tasks")]
#[derive(Debug, Deserialize, Serialize)]
pub struct GetBoard {
    pub board_id: BoardId,
}

impl GetBoard {
    pub fn new(board_id: impl Into<BoardId>) -> Self {
        Self {
            board_id: board_id.into(),
        }
    }
}

#[async_trait]
impl<S: BoardStore> Execute<Session<S>, BoardError> for GetBoard {
    type Output = BoardState;

    async fn execute(&self, ctx: &Session<S>) -> ExecutionResult<BoardState, BoardError> {
        match ctx.snapshot(&self.board_id).await {
            Ok(value) => ExecutionResult::Unlogged { value },
            Err(error) => ExecutionResult::Failed {
                error,
                log_entry: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::CreateBoard;
    use crate::config::BoardConfig;
    use crate::context::BoardContext;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_get_board() {
        let ctx = BoardContext::new(MemoryStore::new(), BoardConfig::default());
        let owner = ctx.session("owner");
        let created = CreateBoard::new("Test")
            .execute(&owner)
            .await
            .into_result()
            .unwrap();

        let result = GetBoard::new(created.id()).execute(&owner).await;
        assert!(!result.should_log());
        assert_eq!(result.into_result().unwrap(), created);
    }

    #[tokio::test]
    async fn test_get_board_denied_to_outsider() {
        let ctx = BoardContext::new(MemoryStore::new(), BoardConfig::default());
        let created = CreateBoard::new("Test")
            .execute(&ctx.session("owner"))
            .await
            .into_result()
            .unwrap();

        let err = GetBoard::new(created.id())
            .execute(&ctx.session("mallory"))
            .await
            .into_result()
            .unwrap_err();
        assert!(matches!(err, BoardError::Unauthorized { .. }));
    }
}
