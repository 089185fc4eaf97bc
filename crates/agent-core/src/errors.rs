use thiserror::Error;

/// Errors that keep a session from starting.
///
/// Everything that happens after a session is underway (transport, capture or
/// action failures) is reported through the session outcome instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Missing credential or empty task instructions.
    #[error("invalid session request: {0}")]
    Validation(String),

    #[error("a session is already running")]
    AlreadyRunning,

    #[error("session orchestrator is missing its {0}")]
    MissingComponent(&'static str),
}

impl SessionError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
