//! Operation metadata and execution traits

use crate::ExecutionResult;
use async_trait::async_trait;
use serde::Serialize;

/// Self-describing operation metadata
///
/// Implemented by the `#[operation]` attribute macro.
pub trait Operation {
    /// Verb, e.g. "move"
    fn verb(&self) -> &'static str;

    /// Noun, e.g. "task"
    fn noun(&self) -> &'static str;

    /// One-line human description
    fn description(&self) -> &'static str;

    /// Canonical op string used in logs: "verb noun"
    fn op_string(&self) -> String {
        format!("{} {}", self.verb(), self.noun())
    }
}

/// Execute an operation against a context `C`, failing with `E`
#[async_trait]
pub trait Execute<C, E>: Operation + Serialize + Send + Sync
where
    C: Send + Sync,
    E: Send,
{
    /// The value produced on success
    type Output: Serialize + Send;

    /// Run the operation
    async fn execute(&self, ctx: &C) -> ExecutionResult<Self::Output, E>;

    /// Entity ids touched by a successful run, recorded in the audit log
    fn affected_resources(&self, _output: &Self::Output) -> Vec<String> {
        Vec::new()
    }
}
