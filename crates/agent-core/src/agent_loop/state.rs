//! Session value and state machine phases.

use deskpilot_core_types::SessionId;
use serde::Serialize;

use super::config::SessionConfig;
use crate::usage::TokenUsage;

/// Where a session currently is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    Starting,
    CapturingInitial,
    AwaitingModel,
    ExecutingActions,
    Recapturing,
    Terminal { outcome: SessionOutcome },
}

/// Terminal sub-state of a finished session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionOutcome {
    Completed { summary: String },
    Failed { reason: String },
    Stopped,
    MaxStepsReached { max_steps: u32 },
    Error { message: String },
}

impl SessionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionOutcome::Completed { .. } => "completed",
            SessionOutcome::Failed { .. } => "failed",
            SessionOutcome::Stopped => "stopped",
            SessionOutcome::MaxStepsReached { .. } => "max_steps_reached",
            SessionOutcome::Error { .. } => "error",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SessionOutcome::Completed { .. })
    }

    /// Text for the persistent status line.
    pub fn status_line(&self) -> String {
        match self {
            SessionOutcome::Completed { .. } => "Session complete ✓".to_string(),
            SessionOutcome::Failed { reason } => format!("Task failed: {reason}"),
            SessionOutcome::Stopped => "Stopped by user".to_string(),
            SessionOutcome::MaxStepsReached { .. } => "Max steps reached".to_string(),
            SessionOutcome::Error { message } => format!("Error: {message}"),
        }
    }
}

/// One agent run. Owned by the orchestrator for the length of `run` and
/// handed back inside the report.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: SessionId,
    pub model: String,
    pub target_context: String,
    pub max_steps: u32,
    pub step_count: u32,
    pub usage: TokenUsage,
    pub phase: SessionPhase,
}

impl Session {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            id: SessionId::new(),
            model: config.model.clone(),
            target_context: config.target_context.clone(),
            max_steps: config.max_steps,
            step_count: 0,
            usage: TokenUsage::default(),
            phase: SessionPhase::Idle,
        }
    }

    pub fn is_running(&self) -> bool {
        !matches!(self.phase, SessionPhase::Idle | SessionPhase::Terminal { .. })
    }

    pub fn cost_usd(&self) -> f64 {
        self.usage.cost_usd(&self.model)
    }

    pub fn outcome(&self) -> Option<&SessionOutcome> {
        match &self.phase {
            SessionPhase::Terminal { outcome } => Some(outcome),
            _ => None,
        }
    }
}
