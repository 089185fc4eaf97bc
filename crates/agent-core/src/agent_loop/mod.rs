//! Agent loop (capture, think, act) execution.
//!
//! # Architecture
//!
//! ```text
//! screen = capture()
//! while step < max && !stopped:
//!     reply = model.exchange(transcript)
//!     if reply has a sentinel: finish
//!     for action in reply.tool_calls: execute(action)
//!     screen = capture()
//!     transcript.push(results(screen))
//! ```
//!
//! # Key Components
//!
//! - [`SessionConfig`]: model, target context, step budget and pacing
//! - [`SessionOrchestrator`]: the state machine that drives one session
//! - [`SessionEvent`]: status, log and progress updates for the operator
//! - [`SessionReport`]: final outcome, counters and transcript

pub mod config;
pub mod controller;
pub mod events;
pub mod prompt;
pub mod state;

pub use config::SessionConfig;
pub use controller::{SessionOrchestrator, SessionOrchestratorBuilder, SessionReport};
pub use events::{EventHub, LogEntry, LogKind, SessionEvent, LOG_TEXT_LIMIT};
pub use prompt::{
    format_system_prompt, format_task_message, scan_sentinel, Sentinel, COMPLETION_SENTINEL,
    CONTINUATION_PROMPT, FAILURE_SENTINEL,
};
pub use state::{Session, SessionOutcome, SessionPhase};
