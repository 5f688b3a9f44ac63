//! UpdateBoard command

use crate::context::{finish, Session};
use crate::error::{BoardError, Result};
use crate::policy::Permission;
use crate::store::BoardStore;
use crate::types::{Board, BoardId};
use crate::validate;
use serde::{Deserialize, Serialize};
use taskboard_operations::{async_trait, operation, Execute, ExecutionResult, Operation};

/// Change board metadata
#[operation(verb = "update", noun = "board", description = "Update board title or icon")]
#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateBoard {
    pub board_id: BoardId,
    /// New title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New icon
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl UpdateBoard {
    pub fn new(board_id: impl Into<BoardId>) -> Self {
        Self {
            board_id: board_id.into(),
            title: None,
            icon: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

#[async_trait]
impl<S: BoardStore> Execute<Session<S>, BoardError> for UpdateBoard {
    type Output = Board;

    async fn execute(&self, ctx: &Session<S>) -> ExecutionResult<Board, BoardError> {
        let start = std::time::Instant::now();
        let input = serde_json::to_value(self).unwrap_or_default();

        let result: Result<Board> = async {
            let title = self
                .title
                .as_deref()
                .map(|raw| validate::title("title", raw, ctx.config().max_title_len))
                .transpose()?;

            let mut tx = ctx.begin(&self.board_id).await?;
            tx.authorize(Permission::Administer)?;

            let board = &mut tx.state_mut().board;
            if let Some(title) = title {
                board.title = title;
            }
            if let Some(icon) = &self.icon {
                board.icon = icon.clone();
            }

            Ok(tx.commit().await?.board)
        }
        .await;

        finish(self.op_string(), input, start, result)
    }

    fn affected_resources(&self, output: &Board) -> Vec<String> {
        vec![output.id.to_string()]
    }
}
