//! BoardState - everything one board transaction reads and writes

use super::board::{Board, BoardMembership, Column, ColumnWithTasks, Role};
use super::ids::{BoardId, ColumnId, TaskId, UserId};
use super::task::Task;
use crate::error::{BoardError, Result};
use crate::position;
use serde::{Deserialize, Serialize};

/// A board with its members, columns and tasks.
///
/// This is the unit the store persists atomically. `version` increases by
/// one on every committed mutation and doubles as the board's event sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardState {
    pub board: Board,
    #[serde(default)]
    pub members: Vec<BoardMembership>,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub version: u64,
}

impl BoardState {
    /// A fresh board whose owner is also its first admin
    pub fn new(board: Board) -> Self {
        let owner = BoardMembership {
            board_id: board.id.clone(),
            user_id: board.owner_id.clone(),
            role: Role::Admin,
        };
        Self {
            board,
            members: vec![owner],
            columns: Vec::new(),
            tasks: Vec::new(),
            version: 0,
        }
    }

    pub fn id(&self) -> &BoardId {
        &self.board.id
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    pub fn column(&self, id: &ColumnId) -> Option<&Column> {
        self.columns.iter().find(|c| &c.id == id)
    }

    pub fn column_mut(&mut self, id: &ColumnId) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| &c.id == id)
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn task_mut(&mut self, id: &TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| &t.id == id)
    }

    /// Membership role of a user, if any
    pub fn role_of(&self, user_id: &UserId) -> Option<Role> {
        self.members
            .iter()
            .find(|m| &m.user_id == user_id)
            .map(|m| m.role)
    }

    // =========================================================================
    // Sibling sets
    // =========================================================================

    /// Column ids in position order
    pub fn column_ids(&self) -> Vec<ColumnId> {
        position::ordered_ids(self.columns.iter())
    }

    /// Tasks of a column in position order
    pub fn tasks_in(&self, column_id: &ColumnId) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|t| &t.column_id == column_id)
            .collect();
        tasks.sort_by_key(|t| t.position);
        tasks
    }

    /// Task ids of a column in position order
    pub fn task_ids_in(&self, column_id: &ColumnId) -> Vec<TaskId> {
        position::ordered_ids(self.tasks.iter().filter(|t| &t.column_id == column_id))
    }

    /// A column with its ordered tasks
    pub fn column_with_tasks(&self, column_id: &ColumnId) -> Option<ColumnWithTasks> {
        let column = self.column(column_id)?.clone();
        let tasks = self.tasks_in(column_id).into_iter().cloned().collect();
        Some(ColumnWithTasks { column, tasks })
    }

    /// All columns with their tasks, in display order
    pub fn ordered_columns(&self) -> Vec<ColumnWithTasks> {
        self.column_ids()
            .iter()
            .filter_map(|id| self.column_with_tasks(id))
            .collect()
    }

    // =========================================================================
    // Position writes
    // =========================================================================

    /// Make `ordered` the column order of this board
    pub fn apply_column_order(&mut self, ordered: &[ColumnId]) -> usize {
        let ordering = position::sequence(ordered);
        position::apply_sequence(self.columns.iter_mut(), &ordering)
    }

    /// Make `ordered` the task order of `column_id`
    pub fn apply_task_order(&mut self, column_id: &ColumnId, ordered: &[TaskId]) -> usize {
        let ordering = position::sequence(ordered);
        position::apply_sequence(
            self.tasks.iter_mut().filter(|t| &t.column_id == column_id),
            &ordering,
        )
    }

    /// Verify every parent's children form a dense sequence
    pub fn check_density(&self) -> Result<()> {
        let column_positions: Vec<usize> = self.columns.iter().map(|c| c.position).collect();
        if !position::is_dense(column_positions.iter().copied()) {
            return Err(BoardError::InvariantViolation {
                parent: format!("board {}", self.board.id),
                positions: sorted(column_positions),
            });
        }

        for column in &self.columns {
            let positions: Vec<usize> = self
                .tasks
                .iter()
                .filter(|t| t.column_id == column.id)
                .map(|t| t.position)
                .collect();
            if !position::is_dense(positions.iter().copied()) {
                return Err(BoardError::InvariantViolation {
                    parent: format!("column {}", column.id),
                    positions: sorted(positions),
                });
            }
        }

        if let Some(orphan) = self.tasks.iter().find(|t| self.column(&t.column_id).is_none()) {
            return Err(BoardError::InvariantViolation {
                parent: format!("column {} (missing, owns task {})", orphan.column_id, orphan.id),
                positions: vec![orphan.position],
            });
        }

        Ok(())
    }
}

fn sorted(mut positions: Vec<usize>) -> Vec<usize> {
    positions.sort_unstable();
    positions
}
