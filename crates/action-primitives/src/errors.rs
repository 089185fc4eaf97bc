//! Error types for action primitives

use thiserror::Error;

/// Failures raised while decoding or executing a single UI action.
///
/// None of these end a session: the executor folds them into an
/// [`Outcome`](crate::Outcome) and the orchestrator logs and moves on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// The model asked for an action kind this agent does not implement
    #[error("Unsupported action: {0}")]
    UnsupportedAction(String),

    /// The tool input was missing a field or carried a malformed one
    #[error("Invalid action input: {0}")]
    InvalidInput(String),

    /// The host primitive is not available on this machine
    #[error("Primitive unavailable: {0}")]
    Unavailable(String),

    /// The host call ran but reported failure
    #[error("Host call failed: {0}")]
    Host(String),

    /// Reading or writing the system clipboard failed
    #[error("Clipboard error: {0}")]
    Clipboard(String),
}

impl ActionError {
    /// Protocol-shape problems come from the model, not the host.
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            ActionError::UnsupportedAction(_) | ActionError::InvalidInput(_)
        )
    }
}
