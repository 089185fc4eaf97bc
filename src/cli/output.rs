//! Terminal rendering of session events.

use agent_core::{format_cost, LogEntry, LogKind, SessionEvent};
use chrono::Local;
use clap::ValueEnum;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

fn tag(kind: LogKind) -> &'static str {
    match kind {
        LogKind::Info => "info",
        LogKind::Step => "step",
        LogKind::Ai => "ai",
        LogKind::Action => "act",
        LogKind::Success => "ok",
        LogKind::Error => "error",
    }
}

/// `[14:03:22] step    Step 2/50` with the timestamp in local time.
pub fn format_log_line(entry: &LogEntry) -> String {
    format!(
        "[{}] {:<7} {}",
        entry.at.with_timezone(&Local).format("%H:%M:%S"),
        tag(entry.kind),
        entry.message
    )
}

/// One line per event worth showing, `None` for the rest.
///
/// Progress and phase changes are already reflected in the status text, and
/// captures are handled by the preview writer.
pub fn render_event(event: &SessionEvent, format: OutputFormat) -> Option<String> {
    if format == OutputFormat::Json {
        return match event {
            SessionEvent::Capture { .. } => None,
            other => serde_json::to_string(other).ok(),
        };
    }
    match event {
        SessionEvent::Status { text } => Some(format!("» {text}")),
        SessionEvent::Log(entry) => Some(format_log_line(entry)),
        SessionEvent::Usage { usage, cost_usd } => Some(format!(
            "           tokens {} in / {} out, cost {}",
            usage.input_tokens,
            usage.output_tokens,
            format_cost(*cost_usd)
        )),
        SessionEvent::Progress { .. } | SessionEvent::State(_) | SessionEvent::Capture { .. } => {
            None
        }
    }
}
