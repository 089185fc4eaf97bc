//! AppleScript plumbing: script text builders and the `osascript` runner.

use std::io::ErrorKind;

use action_primitives::{ActionError, ClickKind, Modifiers, ScrollDirection};
use deskpilot_core_types::LogicalPoint;
use tokio::process::Command;
use tracing::debug;

const SYSTEM_EVENTS: &str = "tell application \"System Events\"";

/// Runs a (possibly multi-line) AppleScript, one `-e` per line.
pub async fn run_script(script: &str) -> Result<String, ActionError> {
    let mut command = Command::new("osascript");
    for line in script.lines() {
        command.arg("-e").arg(line);
    }
    debug!(%script, "osascript");

    let output = command.output().await.map_err(|err| {
        if err.kind() == ErrorKind::NotFound {
            ActionError::Unavailable("osascript is not installed".into())
        } else {
            ActionError::Host(format!("failed to launch osascript: {err}"))
        }
    })?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Err(ActionError::Host(if stderr.is_empty() {
            format!("osascript exited with {}", output.status)
        } else {
            stderr
        }))
    }
}

/// Quotes `text` as an AppleScript string literal.
pub fn quote(text: &str) -> String {
    let escaped = text.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

fn using_clause(modifiers: Modifiers) -> String {
    let mut names = Vec::new();
    if modifiers.contains(Modifiers::COMMAND) {
        names.push("command down");
    }
    if modifiers.contains(Modifiers::SHIFT) {
        names.push("shift down");
    }
    if modifiers.contains(Modifiers::OPTION) {
        names.push("option down");
    }
    if names.is_empty() {
        String::new()
    } else {
        format!(" using {{{}}}", names.join(", "))
    }
}

pub fn click_script(at: LogicalPoint, kind: ClickKind) -> String {
    let (x, y) = (at.x, at.y);
    match kind {
        ClickKind::Left => format!("{SYSTEM_EVENTS} to click at {{{x}, {y}}}"),
        ClickKind::Double => format!("{SYSTEM_EVENTS} to double click at {{{x}, {y}}}"),
        // control-click stands in for a secondary click
        ClickKind::Right => format!("{SYSTEM_EVENTS} to click at {{{x}, {y}}} with {{control down}}"),
    }
}

pub fn move_cursor_script(to: LogicalPoint) -> String {
    format!(
        "{SYSTEM_EVENTS} to set the position of cursor to {{{}, {}}}",
        to.x, to.y
    )
}

pub fn key_code_script(code: u16, modifiers: Modifiers) -> String {
    format!("{SYSTEM_EVENTS} to key code {code}{}", using_clause(modifiers))
}

pub fn keystroke_script(text: &str, modifiers: Modifiers) -> String {
    format!(
        "{SYSTEM_EVENTS} to keystroke {}{}",
        quote(text),
        using_clause(modifiers)
    )
}

/// Scrolls every UI element of the frontmost window; positive is up.
pub fn scroll_script(direction: ScrollDirection, amount: u32) -> String {
    let amount = i64::from(amount);
    let delta = match direction {
        ScrollDirection::Up => amount,
        ScrollDirection::Down => -amount,
    };
    format!(
        "{SYSTEM_EVENTS}\nscroll (every UI element of (first window of (first process whose frontmost is true))) by {delta}\nend tell"
    )
}
