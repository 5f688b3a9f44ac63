//! Committed changes and the events that carry them to clients

use super::board::{Column, ColumnWithTasks};
use super::ids::{BoardId, ClientId, ColumnId, TaskId};
use super::task::Task;
use serde::{Deserialize, Serialize};

/// What a committed mutation did, with the final order of every touched parent.
///
/// Serialized as `{"event": "task.moved", "payload": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum BoardChange {
    #[serde(rename = "task.created")]
    TaskCreated { task: Task, task_ids: Vec<TaskId> },

    #[serde(rename = "task.updated")]
    TaskUpdated { task: Task },

    #[serde(rename = "task.deleted")]
    TaskDeleted {
        task_id: TaskId,
        column_id: ColumnId,
        task_ids: Vec<TaskId>,
    },

    #[serde(rename = "task.moved")]
    TaskMoved {
        task: Task,
        from_column_id: ColumnId,
        to_column_id: ColumnId,
        from_task_ids: Vec<TaskId>,
        to_task_ids: Vec<TaskId>,
    },

    #[serde(rename = "column.created")]
    ColumnCreated {
        column: ColumnWithTasks,
        column_ids: Vec<ColumnId>,
    },

    #[serde(rename = "column.updated")]
    ColumnUpdated { column: Column },

    #[serde(rename = "column.deleted")]
    ColumnDeleted {
        column_id: ColumnId,
        column_ids: Vec<ColumnId>,
        /// Tasks removed together with the column
        #[serde(default)]
        task_ids: Vec<TaskId>,
    },

    #[serde(rename = "column.moved")]
    ColumnMoved {
        board_id: BoardId,
        column_ids: Vec<ColumnId>,
    },
}

/// Final order of one parent container after a change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentOrder {
    Columns {
        board_id: BoardId,
        column_ids: Vec<ColumnId>,
    },
    Tasks {
        column_id: ColumnId,
        task_ids: Vec<TaskId>,
    },
}

impl BoardChange {
    /// Event name, e.g. "task.moved"
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::TaskCreated { .. } => "task.created",
            Self::TaskUpdated { .. } => "task.updated",
            Self::TaskDeleted { .. } => "task.deleted",
            Self::TaskMoved { .. } => "task.moved",
            Self::ColumnCreated { .. } => "column.created",
            Self::ColumnUpdated { .. } => "column.updated",
            Self::ColumnDeleted { .. } => "column.deleted",
            Self::ColumnMoved { .. } => "column.moved",
        }
    }

    /// Final ordered id lists of every parent container the change touched
    pub fn parent_orders(&self, board_id: &BoardId) -> Vec<ParentOrder> {
        let columns = |column_ids: &Vec<ColumnId>| ParentOrder::Columns {
            board_id: board_id.clone(),
            column_ids: column_ids.clone(),
        };
        match self {
            Self::TaskCreated { task, task_ids } => vec![ParentOrder::Tasks {
                column_id: task.column_id.clone(),
                task_ids: task_ids.clone(),
            }],
            Self::TaskDeleted {
                column_id, task_ids, ..
            } => vec![ParentOrder::Tasks {
                column_id: column_id.clone(),
                task_ids: task_ids.clone(),
            }],
            Self::TaskMoved {
                from_column_id,
                to_column_id,
                from_task_ids,
                to_task_ids,
                ..
            } => {
                let mut orders = vec![ParentOrder::Tasks {
                    column_id: to_column_id.clone(),
                    task_ids: to_task_ids.clone(),
                }];
                if from_column_id != to_column_id {
                    orders.push(ParentOrder::Tasks {
                        column_id: from_column_id.clone(),
                        task_ids: from_task_ids.clone(),
                    });
                }
                orders
            }
            Self::ColumnCreated { column_ids, .. }
            | Self::ColumnDeleted { column_ids, .. }
            | Self::ColumnMoved { column_ids, .. } => vec![columns(column_ids)],
            Self::TaskUpdated { .. } | Self::ColumnUpdated { .. } => Vec::new(),
        }
    }

    /// Ids of the entities the change is about, for audit logs
    pub fn affected_ids(&self) -> Vec<String> {
        match self {
            Self::TaskCreated { task, .. }
            | Self::TaskUpdated { task }
            | Self::TaskMoved { task, .. } => vec![task.id.to_string()],
            Self::TaskDeleted { task_id, .. } => vec![task_id.to_string()],
            Self::ColumnCreated { column, .. } => vec![column.column.id.to_string()],
            Self::ColumnUpdated { column } => vec![column.id.to_string()],
            Self::ColumnDeleted {
                column_id, task_ids, ..
            } => std::iter::once(column_id.to_string())
                .chain(task_ids.iter().map(|t| t.to_string()))
                .collect(),
            Self::ColumnMoved { board_id, .. } => vec![board_id.to_string()],
        }
    }
}

/// Result of a committed mutation, returned to the caller that issued it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffectedState {
    pub board_id: BoardId,
    /// Board version produced by the commit
    pub version: u64,
    pub change: BoardChange,
}

impl AffectedState {
    /// Final ordered id lists of every touched parent
    pub fn parent_orders(&self) -> Vec<ParentOrder> {
        self.change.parent_orders(&self.board_id)
    }
}

/// A change as published on a board topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardEvent {
    pub board_id: BoardId,
    /// The board version this event produced; strictly increasing per board
    pub sequence: u64,
    /// Client that issued the mutation, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<ClientId>,
    pub change: BoardChange,
}

impl BoardEvent {
    pub fn from_affected(affected: &AffectedState, origin: Option<ClientId>) -> Self {
        Self {
            board_id: affected.board_id.clone(),
            sequence: affected.version,
            origin,
            change: affected.change.clone(),
        }
    }

    pub fn event_name(&self) -> &'static str {
        self.change.event_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialized_shape() {
        let change = BoardChange::ColumnMoved {
            board_id: BoardId::from("b1"),
            column_ids: vec![ColumnId::from("c2"), ColumnId::from("c1")],
        };
        let value = serde_json::to_value(&change).unwrap();
        assert_eq!(
            value,
            json!({"event": "column.moved", "payload": {"board_id": "b1", "column_ids": ["c2", "c1"]}})
        );

        let back: BoardChange = serde_json::from_value(value).unwrap();
        assert_eq!(back, change);
    }

    #[test]
    fn test_task_moved_touches_both_columns() {
        let task = Task::new("to", "u", "T");
        let change = BoardChange::TaskMoved {
            task: task.clone(),
            from_column_id: ColumnId::from("from"),
            to_column_id: ColumnId::from("to"),
            from_task_ids: vec![],
            to_task_ids: vec![task.id.clone()],
        };
        assert_eq!(change.event_name(), "task.moved");
        assert_eq!(change.parent_orders(&BoardId::from("b")).len(), 2);
    }

    #[test]
    fn test_same_column_move_touches_one_parent() {
        let task = Task::new("c", "u", "T");
        let change = BoardChange::TaskMoved {
            task: task.clone(),
            from_column_id: ColumnId::from("c"),
            to_column_id: ColumnId::from("c"),
            from_task_ids: vec![task.id.clone()],
            to_task_ids: vec![task.id.clone()],
        };
        assert_eq!(change.parent_orders(&BoardId::from("b")).len(), 1);
    }

    #[test]
    fn test_column_deleted_reports_cascaded_tasks() {
        let change = BoardChange::ColumnDeleted {
            column_id: ColumnId::from("c"),
            column_ids: vec![],
            task_ids: vec![TaskId::from("t1"), TaskId::from("t2")],
        };
        assert_eq!(change.affected_ids(), vec!["c", "t1", "t2"]);
    }
}
