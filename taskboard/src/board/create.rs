//! CreateBoard command

use crate::context::{finish, Session};
use crate::error::{BoardError, Result};
use crate::store::{BoardStore, LockOptions};
use crate::types::{Board, BoardState};
use crate::validate;
use serde::{Deserialize, Serialize};
use taskboard_operations::{async_trait, operation, Execute, ExecutionResult, Operation};

/// Create a board owned by the session user
#[operation(verb = "create", noun = "board", description = "Create a new board")]
#[derive(Debug, Deserialize, Serialize)]
pub struct CreateBoard {
    pub title: String,
    #[serde(default)]
    pub icon: String,
}

impl CreateBoard {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            icon: String::new(),
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }
}

#[async_trait]
impl<S: BoardStore> Execute<Session<S>, BoardError> for CreateBoard {
    type Output = BoardState;

    async fn execute(&self, ctx: &Session<S>) -> ExecutionResult<BoardState, BoardError> {
        let start = std::time::Instant::now();
        let input = serde_json::to_value(self).unwrap_or_default();

        let result: Result<BoardState> = async {
            let title = validate::title("title", &self.title, ctx.config().max_title_len)?;
            let board = Board::new(title, ctx.user_id()).with_icon(self.icon.clone());
            let state = BoardState::new(board);
            ctx.store()
                .insert(&state, LockOptions::from(ctx.config()))
                .await?;
            tracing::info!(board_id = %state.id(), owner = %ctx.user_id(), "board created");
            Ok(state)
        }
        .await;

        finish(self.op_string(), input, start, result)
    }

    fn affected_resources(&self, output: &BoardState) -> Vec<String> {
        vec![output.id().to_string()]
    }
}
