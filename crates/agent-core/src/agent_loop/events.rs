//! Status, log and progress events published while a session runs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;

use super::state::SessionPhase;
use crate::usage::TokenUsage;

/// Longest assistant text echoed to the activity log.
pub const LOG_TEXT_LIMIT: usize = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    Info,
    Step,
    Ai,
    Action,
    Success,
    Error,
}

impl LogKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LogKind::Info => "info",
            LogKind::Step => "step",
            LogKind::Ai => "ai",
            LogKind::Action => "action",
            LogKind::Success => "success",
            LogKind::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub at: DateTime<Utc>,
    pub kind: LogKind,
    pub message: String,
}

impl LogEntry {
    pub fn new(kind: LogKind, message: impl Into<String>) -> Self {
        Self {
            at: Utc::now(),
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Replaces the persistent status line.
    Status { text: String },
    Log(LogEntry),
    Progress { step: u32, max: u32 },
    Usage { usage: TokenUsage, cost_usd: f64 },
    State(SessionPhase),
    /// A fresh screenshot is available for preview.
    Capture {
        width: u32,
        height: u32,
        #[serde(skip)]
        jpeg: Arc<Vec<u8>>,
    },
}

/// Fan-out of session events. Sending never fails, even with no subscribers.
#[derive(Clone)]
pub struct EventHub {
    channel: broadcast::Sender<SessionEvent>,
}

impl Default for EventHub {
    fn default() -> Self {
        Self::with_capacity(512)
    }
}

impl EventHub {
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { channel: tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.channel.subscribe()
    }

    pub fn emit(&self, event: SessionEvent) {
        let _ = self.channel.send(event);
    }

    pub fn status(&self, text: impl Into<String>) {
        self.emit(SessionEvent::Status { text: text.into() });
    }

    pub fn log(&self, kind: LogKind, message: impl Into<String>) {
        self.emit(SessionEvent::Log(LogEntry::new(kind, message)));
    }
}
