//! Fixtures shared by unit tests

use crate::board::{AddMember, CreateBoard};
use crate::column::CreateColumn;
use crate::config::BoardConfig;
use crate::context::BoardContext;
use crate::store::MemoryStore;
use crate::task::CreateTask;
use crate::types::{BoardId, ColumnId, Role, TaskId};
use taskboard_operations::Execute;

pub(crate) const OWNER: &str = "owner";

/// A board owned by [`OWNER`] with the given columns, plus an editor "ed"
/// and a viewer "vi"
pub(crate) async fn board_with_config(
    config: BoardConfig,
    columns: &[&str],
) -> (BoardContext<MemoryStore>, BoardId, Vec<ColumnId>) {
    let ctx = BoardContext::new(MemoryStore::new(), config);
    let owner = ctx.session(OWNER);
    let state = CreateBoard::new("Test")
        .execute(&owner)
        .await
        .into_result()
        .unwrap();
    let board_id = state.id().clone();

    for (user, role) in [("ed", Role::Editor), ("vi", Role::Viewer)] {
        AddMember::new(&board_id, user, role)
            .execute(&owner)
            .await
            .into_result()
            .unwrap();
    }

    let mut column_ids = Vec::new();
    for title in columns {
        let affected = CreateColumn::new(&board_id, *title)
            .execute(&owner)
            .await
            .into_result()
            .unwrap();
        column_ids.push(affected.change.affected_ids()[0].as_str().into());
    }
    (ctx, board_id, column_ids)
}

pub(crate) async fn board(columns: &[&str]) -> (BoardContext<MemoryStore>, BoardId, Vec<ColumnId>) {
    board_with_config(BoardConfig::default(), columns).await
}

/// Create tasks in a column, returning their ids in creation order
pub(crate) async fn tasks(
    ctx: &BoardContext<MemoryStore>,
    column_id: &ColumnId,
    titles: &[&str],
) -> Vec<TaskId> {
    let owner = ctx.session(OWNER);
    let mut ids = Vec::new();
    for title in titles {
        let affected = CreateTask::new(column_id, *title)
            .execute(&owner)
            .await
            .into_result()
            .unwrap();
        ids.push(affected.change.affected_ids()[0].as_str().into());
    }
    ids
}

/// Titles of a column's tasks in position order
pub(crate) async fn titles(
    ctx: &BoardContext<MemoryStore>,
    board_id: &BoardId,
    column_id: &ColumnId,
) -> Vec<String> {
    use crate::store::BoardStore;
    let state = ctx.store().load(board_id).await.unwrap();
    state
        .tasks_in(column_id)
        .into_iter()
        .map(|t| t.title.clone())
        .collect()
}
