//! Request validation shared by commands
//!
//! Runs before any position is computed or any row is written.

use crate::error::{BoardError, Result};
use crate::policy;
use crate::types::{BoardState, UserId};
use std::collections::HashSet;
use std::fmt::Display;
use std::hash::Hash;

/// Trimmed, non-empty title of at most `max_len` characters
pub fn title(field: &str, raw: &str, max_len: usize) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(BoardError::missing_field(field));
    }
    let len = trimmed.chars().count();
    if len > max_len {
        return Err(BoardError::invalid_value(
            field,
            format!("must be at most {} characters, got {}", max_len, len),
        ));
    }
    Ok(trimmed.to_string())
}

/// An assignee must belong to the board
pub fn assignee(state: &BoardState, assignee: Option<&UserId>) -> Result<()> {
    match assignee {
        Some(user) if !policy::is_participant(state, user) => Err(BoardError::invalid_value(
            "assignee_id",
            format!("{} is not a member of board {}", user, state.board.id),
        )),
        _ => Ok(()),
    }
}

/// Every id of an ordering list must be known, and listed only once
pub fn ordering<I, F>(ids: &[I], exists: F) -> Result<()>
where
    I: Eq + Hash + Display,
    F: Fn(&I) -> bool,
{
    let mut seen = HashSet::with_capacity(ids.len());
    for id in ids {
        if !seen.insert(id) {
            return Err(BoardError::DuplicateSibling { id: id.to_string() });
        }
        if !exists(id) {
            return Err(BoardError::UnknownSibling { id: id.to_string() });
        }
    }
    Ok(())
}
