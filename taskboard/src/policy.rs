//! Board authorization policy
//!
//! The engine receives an already authenticated user id. Whether that user
//! may act on a board is decided here against the loaded board state, before
//! any position computation happens.

use crate::error::{BoardError, Result};
use crate::types::{BoardState, Role, UserId};

/// Actions gated by board membership
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Read snapshots and subscribe to the board topic
    View,
    /// Create, move, rename and delete columns and tasks
    Edit,
    /// Manage membership
    Administer,
}

impl Permission {
    fn action(self) -> &'static str {
        match self {
            Permission::View => "view",
            Permission::Edit => "edit",
            Permission::Administer => "administer",
        }
    }
}

/// Effective role of a user on a board. The owner is always an admin.
pub fn role_of(state: &BoardState, user_id: &UserId) -> Option<Role> {
    if &state.board.owner_id == user_id {
        return Some(Role::Admin);
    }
    state.role_of(user_id)
}

/// Whether the user holds `permission` on the board
pub fn allows(state: &BoardState, user_id: &UserId, permission: Permission) -> bool {
    match (role_of(state, user_id), permission) {
        (None, _) => false,
        (Some(_), Permission::View) => true,
        (Some(role), Permission::Edit) => role.can_edit(),
        (Some(role), Permission::Administer) => role.can_administer(),
    }
}

/// Fail with an authorization error unless the user holds `permission`
pub fn authorize(state: &BoardState, user_id: &UserId, permission: Permission) -> Result<()> {
    if allows(state, user_id, permission) {
        Ok(())
    } else {
        tracing::warn!(
            user = %user_id,
            board = %state.board.id,
            action = permission.action(),
            "authorization denied"
        );
        Err(BoardError::unauthorized(
            user_id,
            &state.board.id,
            permission.action(),
        ))
    }
}

/// Whether the user belongs to the board at all (owner or any role)
pub fn is_participant(state: &BoardState, user_id: &UserId) -> bool {
    role_of(state, user_id).is_some()
}
