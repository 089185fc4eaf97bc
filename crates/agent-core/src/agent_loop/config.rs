//! Configuration for a single agent session.

use action_primitives::TimingPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::gateway::DEFAULT_MAX_TOKENS;
use crate::usage::DEFAULT_MODEL;

/// Configuration for the capture, think, act loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Model identifier sent with every exchange.
    pub model: String,

    /// Application or context the agent is meant to operate on.
    /// Default: "Finder"
    pub target_context: String,

    /// Model exchanges before the session ends as max-steps-reached.
    /// Default: 50
    pub max_steps: u32,

    /// Output-token cap per exchange.
    /// Default: 4096
    pub max_tokens: u32,

    /// Pause after each executed action in milliseconds.
    /// Default: 600
    pub step_delay_ms: u64,

    /// Pause before the post-action capture in milliseconds.
    /// Default: 300
    pub recapture_delay_ms: u64,

    /// Settle and clipboard timing for input injection.
    pub timing: TimingPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            target_context: "Finder".to_string(),
            max_steps: 50,
            max_tokens: DEFAULT_MAX_TOKENS,
            step_delay_ms: 600,
            recapture_delay_ms: 300,
            timing: TimingPolicy::default(),
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// No pauses at all, for tests.
    pub fn immediate() -> Self {
        Self {
            step_delay_ms: 0,
            recapture_delay_ms: 0,
            timing: TimingPolicy::immediate(),
            ..Self::default()
        }
    }

    /// Builder: set the model.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Builder: set the target context.
    pub fn target_context(mut self, target: impl Into<String>) -> Self {
        self.target_context = target.into();
        self
    }

    /// Builder: set max steps.
    pub fn max_steps(mut self, steps: u32) -> Self {
        self.max_steps = steps;
        self
    }

    /// Builder: set the per-action step delay.
    pub fn step_delay_ms(mut self, ms: u64) -> Self {
        self.step_delay_ms = ms;
        self
    }

    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    pub fn recapture_delay(&self) -> Duration {
        Duration::from_millis(self.recapture_delay_ms)
    }
}
