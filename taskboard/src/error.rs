//! Error types for the board engine

use thiserror::Error;

/// Result type for board operations
pub type Result<T> = std::result::Result<T, BoardError>;

/// Coarse error classes surfaced to the calling boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed request; rejected before any store write
    Validation,
    /// The store could not serialize the transaction; retry from a fresh read
    Conflict,
    /// A referenced entity no longer exists; refetch authoritative state
    NotFound,
    /// The caller lacks privilege on the board
    Authorization,
    /// Storage, serialization or configuration failure
    Internal,
}

/// Errors that can occur in board operations
#[derive(Debug, Error)]
pub enum BoardError {
    /// Board not found
    #[error("board not found: {id}")]
    BoardNotFound { id: String },

    /// Column not found
    #[error("column not found: {id}")]
    ColumnNotFound { id: String },

    /// Task not found
    #[error("task not found: {id}")]
    TaskNotFound { id: String },

    /// Duplicate ID
    #[error("duplicate {item_type} ID: {id}")]
    DuplicateId { item_type: String, id: String },

    /// An ordering list names an id that is not part of the board
    #[error("unknown sibling in ordering: {id}")]
    UnknownSibling { id: String },

    /// An ordering list names the same id twice
    #[error("duplicate sibling in ordering: {id}")]
    DuplicateSibling { id: String },

    /// Missing required field
    #[error("missing required field: {field}")]
    MissingField { field: String },

    /// Invalid field value
    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    /// Caller lacks the required permission on a board
    #[error("user {user_id} may not {action} board {board_id}")]
    Unauthorized {
        user_id: String,
        board_id: String,
        action: String,
    },

    /// Lock is held by another transaction
    #[error("lock busy - another operation in progress")]
    LockBusy,

    /// Lock timeout
    #[error("lock timeout after {elapsed_ms}ms")]
    LockTimeout { elapsed_ms: u64 },

    /// A subscriber fell behind and events were dropped
    #[error("subscription to board {board_id} lagged by {skipped} events")]
    SubscriptionLagged { board_id: String, skipped: u64 },

    /// The topic was closed
    #[error("subscription to board {board_id} closed")]
    SubscriptionClosed { board_id: String },

    /// A parent's positions are not dense; the commit was refused
    #[error("positions of {parent} are not dense: {positions:?}")]
    InvariantViolation {
        parent: String,
        positions: Vec<usize>,
    },

    /// Configuration could not be loaded or is invalid
    #[error("configuration error: {message}")]
    Config { message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BoardError {
    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a duplicate ID error
    pub fn duplicate_id(item_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::DuplicateId {
            item_type: item_type.into(),
            id: id.into(),
        }
    }

    /// Create an authorization error
    pub fn unauthorized(
        user_id: impl std::fmt::Display,
        board_id: impl std::fmt::Display,
        action: impl Into<String>,
    ) -> Self {
        Self::Unauthorized {
            user_id: user_id.to_string(),
            board_id: board_id.to_string(),
            action: action.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Classify the error for the calling boundary
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateId { .. }
            | Self::UnknownSibling { .. }
            | Self::DuplicateSibling { .. }
            | Self::MissingField { .. }
            | Self::InvalidValue { .. } => ErrorKind::Validation,
            Self::LockBusy | Self::LockTimeout { .. } | Self::SubscriptionLagged { .. } => {
                ErrorKind::Conflict
            }
            Self::BoardNotFound { .. } | Self::ColumnNotFound { .. } | Self::TaskNotFound { .. } => {
                ErrorKind::NotFound
            }
            Self::Unauthorized { .. } => ErrorKind::Authorization,
            Self::SubscriptionClosed { .. }
            | Self::InvariantViolation { .. }
            | Self::Config { .. }
            | Self::Io(_)
            | Self::Json(_) => ErrorKind::Internal,
        }
    }

    /// Check if this is a retryable error
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::LockBusy | Self::LockTimeout { .. })
    }

    /// Whether the client must refetch authoritative state instead of retrying
    pub fn requires_refetch(&self) -> bool {
        matches!(
            self,
            Self::BoardNotFound { .. }
                | Self::ColumnNotFound { .. }
                | Self::TaskNotFound { .. }
                | Self::SubscriptionLagged { .. }
        )
    }
}

impl From<figment::Error> for BoardError {
    fn from(error: figment::Error) -> Self {
        Self::config(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BoardError::TaskNotFound {
            id: "abc123".into(),
        };
        assert_eq!(err.to_string(), "task not found: abc123");
    }

    #[test]
    fn test_unauthorized_display() {
        let err = BoardError::unauthorized("u1", "b1", "edit");
        assert_eq!(err.to_string(), "user u1 may not edit board b1");
        assert_eq!(err.kind(), ErrorKind::Authorization);
    }

    #[test]
    fn test_kinds() {
        assert_eq!(
            BoardError::invalid_value("title", "empty").kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            BoardError::UnknownSibling { id: "x".into() }.kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            BoardError::LockTimeout { elapsed_ms: 5 }.kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            BoardError::ColumnNotFound { id: "c".into() }.kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_retryable() {
        assert!(BoardError::LockBusy.is_retryable());
        assert!(BoardError::LockTimeout { elapsed_ms: 10 }.is_retryable());
        assert!(!BoardError::TaskNotFound { id: "x".into() }.is_retryable());
    }

    #[test]
    fn test_requires_refetch() {
        assert!(BoardError::TaskNotFound { id: "x".into() }.requires_refetch());
        assert!(!BoardError::LockBusy.requires_refetch());
        assert!(!BoardError::missing_field("title").requires_refetch());
    }
}
