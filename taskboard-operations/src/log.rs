//! Log entry types for operation tracking

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A log entry recording an operation execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Unique ID for this log entry (ULID format)
    pub id: String,

    /// When the operation occurred
    pub timestamp: DateTime<Utc>,

    /// Canonical op string (e.g., "create task", "move column")
    pub op: String,

    /// The normalized input parameters (as JSON)
    pub input: Value,

    /// The result value or error (as JSON)
    pub output: Value,

    /// Who performed the operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,

    /// Entity ids touched by the operation
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affected: Vec<String>,

    /// How long the operation took (milliseconds)
    pub duration_ms: u64,
}

impl LogEntry {
    /// Create a new log entry
    pub fn new(
        op: impl Into<String>,
        input: Value,
        output: Value,
        actor: Option<String>,
        duration_ms: u64,
    ) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            timestamp: Utc::now(),
            op: op.into(),
            input,
            output,
            actor,
            affected: Vec::new(),
            duration_ms,
        }
    }

    /// Create a log entry for a failed operation
    pub fn failure(op: impl Into<String>, input: Value, error: &str, duration_ms: u64) -> Self {
        Self::new(
            op,
            input,
            serde_json::json!({ "error": error }),
            None,
            duration_ms,
        )
    }

    /// Set the actor
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// Record the entity ids the operation touched
    pub fn with_affected(mut self, affected: Vec<String>) -> Self {
        self.affected = affected;
        self
    }

    /// Whether this entry records a failure
    pub fn is_failure(&self) -> bool {
        self.output.get("error").is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failure_entry() {
        let entry = LogEntry::failure("delete task", json!({"task_id": "t1"}), "task not found", 3);
        assert!(entry.is_failure());
        assert_eq!(entry.output["error"], "task not found");
        assert!(entry.actor.is_none());
    }

    #[test]
    fn test_serialization_skips_empty_fields() {
        let entry = LogEntry::new("rename column", json!({}), json!({"ok": true}), None, 0);
        let value = serde_json::to_value(&entry).unwrap();
        assert!(value.get("actor").is_none());
        assert!(value.get("affected").is_none());

        let entry = entry
            .with_actor("user-1[client-a]")
            .with_affected(vec!["col-1".into()]);
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["actor"], "user-1[client-a]");
        assert_eq!(value["affected"], json!(["col-1"]));
        assert!(!entry.is_failure());
    }
}
