//! Prompt templates and sentinel detection for the session loop.

/// Marker the model uses to declare success.
pub const COMPLETION_SENTINEL: &str = "TASK COMPLETE:";
/// Marker the model uses to declare an unrecoverable failure.
pub const FAILURE_SENTINEL: &str = "TASK FAILED:";

pub const DEFAULT_COMPLETION_SUMMARY: &str = "Task finished successfully";
pub const DEFAULT_FAILURE_REASON: &str = "Unknown error";

/// User text sent after a text-only assistant turn.
pub const CONTINUATION_PROMPT: &str =
    "Here is the updated screen. Please continue with the next step.";

/// System prompt for a session operating on `target`.
pub fn format_system_prompt(target: &str) -> String {
    format!(
        "You are an AI assistant controlling the {target} application on macOS using the computer tool.

Your job is to complete the following task by interacting with the application UI:
- You will receive screenshots of the screen after each action
- Analyze the screenshot carefully before each action
- Be methodical: find UI elements accurately before clicking
- If {target} is not visible, click its icon in the Dock or use the menubar to bring it to front
- When the task is complete, take a screenshot to confirm and then respond with \"{COMPLETION_SENTINEL} [brief description of what was accomplished]\"
- If you encounter an error you cannot recover from, respond with \"{FAILURE_SENTINEL} [reason]\"

Important reminders:
- Coordinates you provide are in the physical pixel space of the screenshot
- Take your time and be accurate, slow and correct beats fast and wrong
- If an action doesn't seem to have worked, try again or try a different approach"
    )
}

/// First user text, placed after the initial screenshot.
pub fn format_task_message(instructions: &str) -> String {
    format!("Here is the current state of the screen. Please complete this task:\n\n{instructions}")
}

/// A terminal marker found in assistant text, with the text that followed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sentinel {
    Complete(String),
    Failed(String),
}

/// Finds the earliest sentinel in `text`. Matching is case-sensitive.
pub fn scan_sentinel(text: &str) -> Option<Sentinel> {
    let complete = text.find(COMPLETION_SENTINEL);
    let failed = text.find(FAILURE_SENTINEL);

    let (is_complete, index, marker) = match (complete, failed) {
        (Some(c), Some(f)) if f < c => (false, f, FAILURE_SENTINEL),
        (Some(c), _) => (true, c, COMPLETION_SENTINEL),
        (None, Some(f)) => (false, f, FAILURE_SENTINEL),
        (None, None) => return None,
    };

    let tail = text[index + marker.len()..].trim();
    if is_complete {
        let summary = if tail.is_empty() {
            DEFAULT_COMPLETION_SUMMARY
        } else {
            tail
        };
        Some(Sentinel::Complete(summary.to_string()))
    } else {
        let reason = if tail.is_empty() {
            DEFAULT_FAILURE_REASON
        } else {
            tail
        };
        Some(Sentinel::Failed(reason.to_string()))
    }
}
