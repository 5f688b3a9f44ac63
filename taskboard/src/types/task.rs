//! Task type

use super::ids::{ColumnId, TaskId, UserId};
use serde::{Deserialize, Serialize};

/// A task/card. Exclusively owned by its current column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub column_id: ColumnId,
    pub creator_id: UserId,
    #[serde(default)]
    pub assignee_id: Option<UserId>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Dense within the column: 0..M-1
    pub position: usize,
}

impl Task {
    /// Create a new task in a column at position 0
    pub fn new(
        column_id: impl Into<ColumnId>,
        creator_id: impl Into<UserId>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: TaskId::new(),
            column_id: column_id.into(),
            creator_id: creator_id.into(),
            assignee_id: None,
            title: title.into(),
            description: String::new(),
            position: 0,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_assignee(mut self, assignee: Option<UserId>) -> Self {
        self.assignee_id = assignee;
        self
    }
}
