//! Board-level types: Board, Role, BoardMembership, Column

use super::ids::{BoardId, ColumnId, UserId};
use super::task::Task;
use serde::{Deserialize, Serialize};

/// A kanban board. Owns an ordered set of columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub title: String,
    #[serde(default)]
    pub icon: String,
    pub owner_id: UserId,
}

impl Board {
    /// Create a new board owned by `owner_id`
    pub fn new(title: impl Into<String>, owner_id: impl Into<UserId>) -> Self {
        Self {
            id: BoardId::new(),
            title: title.into(),
            icon: String::new(),
            owner_id: owner_id.into(),
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }
}

/// A member's role on a board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Editor,
    Viewer,
}

impl Role {
    /// Whether the role may create, move, rename or delete columns and tasks
    pub fn can_edit(self) -> bool {
        matches!(self, Role::Admin | Role::Editor)
    }

    /// Whether the role may change board settings and membership
    pub fn can_administer(self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Admin => "admin",
            Role::Editor => "editor",
            Role::Viewer => "viewer",
        };
        f.write_str(s)
    }
}

/// Join entity between a board and a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardMembership {
    pub board_id: BoardId,
    pub user_id: UserId,
    pub role: Role,
}

/// A column: a workflow stage holding an ordered list of tasks.
///
/// `position` is dense within the board: 0..N-1, strictly display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub board_id: BoardId,
    pub title: String,
    pub position: usize,
}

impl Column {
    pub fn new(board_id: impl Into<BoardId>, title: impl Into<String>) -> Self {
        Self {
            id: ColumnId::new(),
            board_id: board_id.into(),
            title: title.into(),
            position: 0,
        }
    }
}

/// A column together with its tasks in position order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnWithTasks {
    #[serde(flatten)]
    pub column: Column,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl ColumnWithTasks {
    pub fn id(&self) -> &ColumnId {
        &self.column.id
    }

    /// Task ids in display order
    pub fn task_ids(&self) -> Vec<super::ids::TaskId> {
        self.tasks.iter().map(|t| t.id.clone()).collect()
    }
}
