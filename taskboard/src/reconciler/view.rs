//! Client board view and its pure event reducer

use crate::types::{BoardChange, BoardId, BoardState, ColumnId, ColumnWithTasks, Task, TaskId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Ordered columns with ordered tasks, as a client renders them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardView {
    pub board_id: BoardId,
    /// Last board version this view reflects
    pub version: u64,
    pub columns: Vec<ColumnWithTasks>,
    /// An event referenced something this view does not know about
    #[serde(default)]
    pub stale: bool,
}

impl BoardView {
    pub fn from_state(state: &BoardState) -> Self {
        Self {
            board_id: state.id().clone(),
            version: state.version,
            columns: state.ordered_columns(),
            stale: false,
        }
    }

    pub fn column(&self, id: &ColumnId) -> Option<&ColumnWithTasks> {
        self.columns.iter().find(|c| c.id() == id)
    }

    fn column_mut(&mut self, id: &ColumnId) -> Option<&mut ColumnWithTasks> {
        self.columns.iter_mut().find(|c| c.id() == id)
    }

    pub fn column_ids(&self) -> Vec<ColumnId> {
        self.columns.iter().map(|c| c.id().clone()).collect()
    }

    /// Task ids of a column in display order; empty for an unknown column
    pub fn task_ids(&self, column_id: &ColumnId) -> Vec<TaskId> {
        self.column(column_id)
            .map(ColumnWithTasks::task_ids)
            .unwrap_or_default()
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.columns
            .iter()
            .flat_map(|c| c.tasks.iter())
            .find(|t| &t.id == id)
    }

    /// Take a task out of whichever column holds it
    pub(crate) fn remove_task(&mut self, id: &TaskId) -> Option<Task> {
        for column in &mut self.columns {
            if let Some(index) = column.tasks.iter().position(|t| &t.id == id) {
                return Some(column.tasks.remove(index));
            }
        }
        None
    }

    /// Rearrange a column's tasks into `ordered`, positions = index
    pub(crate) fn order_tasks(&mut self, column_id: &ColumnId, ordered: &[TaskId]) {
        let Some(column) = self.column_mut(column_id) else {
            self.stale = true;
            return;
        };
        let mut by_id: HashMap<TaskId, Task> = column
            .tasks
            .drain(..)
            .map(|t| (t.id.clone(), t))
            .collect();
        let mut missing = false;
        for (position, id) in ordered.iter().enumerate() {
            match by_id.remove(id) {
                Some(mut task) => {
                    task.position = position;
                    task.column_id = column_id.clone();
                    column.tasks.push(task);
                }
                None => missing = true,
            }
        }
        if missing {
            self.stale = true;
        }
    }

    /// Rearrange the columns into `ordered`, positions = index
    pub(crate) fn order_columns(&mut self, ordered: &[ColumnId]) {
        let mut by_id: HashMap<ColumnId, ColumnWithTasks> = self
            .columns
            .drain(..)
            .map(|c| (c.id().clone(), c))
            .collect();
        for (position, id) in ordered.iter().enumerate() {
            match by_id.remove(id) {
                Some(mut column) => {
                    column.column.position = position;
                    self.columns.push(column);
                }
                None => self.stale = true,
            }
        }
    }
}

/// New view with `change` applied.
///
/// Every container the change touches is overwritten with the canonical
/// order it carries; nothing is merged with local state.
pub fn apply_change(view: &BoardView, change: &BoardChange) -> BoardView {
    let mut next = view.clone();
    match change {
        BoardChange::TaskCreated { task, task_ids } => {
            next.remove_task(&task.id);
            match next.column_mut(&task.column_id) {
                Some(column) => column.tasks.push(task.clone()),
                None => next.stale = true,
            }
            next.order_tasks(&task.column_id, task_ids);
        }
        BoardChange::TaskUpdated { task } => {
            let found = next
                .columns
                .iter_mut()
                .flat_map(|c| c.tasks.iter_mut())
                .find(|t| t.id == task.id);
            match found {
                Some(existing) => {
                    let position = existing.position;
                    *existing = task.clone();
                    existing.position = position;
                }
                None => next.stale = true,
            }
        }
        BoardChange::TaskDeleted {
            task_id,
            column_id,
            task_ids,
        } => {
            next.remove_task(task_id);
            next.order_tasks(column_id, task_ids);
        }
        BoardChange::TaskMoved {
            task,
            from_column_id,
            to_column_id,
            from_task_ids,
            to_task_ids,
        } => {
            next.remove_task(&task.id);
            match next.column_mut(to_column_id) {
                Some(column) => column.tasks.push(task.clone()),
                None => next.stale = true,
            }
            if from_column_id != to_column_id {
                next.order_tasks(from_column_id, from_task_ids);
            }
            next.order_tasks(to_column_id, to_task_ids);
        }
        BoardChange::ColumnCreated { column, column_ids } => {
            next.columns.retain(|c| c.id() != column.id());
            next.columns.push(column.clone());
            next.order_columns(column_ids);
        }
        BoardChange::ColumnUpdated { column } => match next.column_mut(&column.id) {
            Some(existing) => existing.column.title = column.title.clone(),
            None => next.stale = true,
        },
        BoardChange::ColumnDeleted {
            column_id,
            column_ids,
            ..
        } => {
            next.columns.retain(|c| c.id() != column_id);
            next.order_columns(column_ids);
        }
        BoardChange::ColumnMoved { column_ids, .. } => next.order_columns(column_ids),
    }
    next
}
