//! The position-affecting mutations as one request type
//!
//! Clients send a [`Mutation`]; the engine dispatches it to the matching
//! command. Serialized as `{"type": "move_task", ...fields}`.

use crate::column::{CreateColumn, DeleteColumn, MoveColumn, RenameColumn};
use crate::context::Session;
use crate::error::{BoardError, Result};
use crate::store::BoardStore;
use crate::task::{CreateTask, DeleteTask, MoveTask, RenameTask};
use crate::types::AffectedState;
use serde::{Deserialize, Serialize};
use taskboard_operations::{async_trait, Execute, ExecutionResult, Operation};

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Mutation {
    CreateTask(CreateTask),
    CreateColumn(CreateColumn),
    MoveTask(MoveTask),
    MoveColumn(MoveColumn),
    DeleteTask(DeleteTask),
    DeleteColumn(DeleteColumn),
    RenameTask(RenameTask),
    RenameColumn(RenameColumn),
}

macro_rules! dispatch {
    ($self:expr, $op:ident => $body:expr) => {
        match $self {
            Mutation::CreateTask($op) => $body,
            Mutation::CreateColumn($op) => $body,
            Mutation::MoveTask($op) => $body,
            Mutation::MoveColumn($op) => $body,
            Mutation::DeleteTask($op) => $body,
            Mutation::DeleteColumn($op) => $body,
            Mutation::RenameTask($op) => $body,
            Mutation::RenameColumn($op) => $body,
        }
    };
}

impl Mutation {
    /// Run the mutation as the session user without recording activity
    pub async fn apply<S: BoardStore>(&self, session: &Session<S>) -> Result<AffectedState> {
        self.execute(session).await.into_result()
    }
}

impl Operation for Mutation {
    fn verb(&self) -> &'static str {
        dispatch!(self, op => op.verb())
    }

    fn noun(&self) -> &'static str {
        dispatch!(self, op => op.noun())
    }

    fn description(&self) -> &'static str {
        dispatch!(self, op => op.description())
    }
}

#[async_trait]
impl<S: BoardStore> Execute<Session<S>, BoardError> for Mutation {
    type Output = AffectedState;

    async fn execute(&self, ctx: &Session<S>) -> ExecutionResult<AffectedState, BoardError> {
        dispatch!(self, op => op.execute(ctx).await)
    }

    fn affected_resources(&self, output: &AffectedState) -> Vec<String> {
        dispatch!(self, op => Execute::<Session<S>, BoardError>::affected_resources(op, output))
    }
}

impl From<MoveTask> for Mutation {
    fn from(op: MoveTask) -> Self {
        Mutation::MoveTask(op)
    }
}

impl From<MoveColumn> for Mutation {
    fn from(op: MoveColumn) -> Self {
        Mutation::MoveColumn(op)
    }
}
