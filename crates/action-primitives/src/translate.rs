//! Action -> input command translation and human-readable descriptions.

use deskpilot_core_types::ScaleFactor;

use crate::coords::point_to_logical;
use crate::keys::KeyTarget;
use crate::types::{Action, ClickKind, InputCommand, Translation};

/// Longest `type` payload shown verbatim in descriptions.
pub const DESCRIBE_TEXT_LIMIT: usize = 40;

/// Maps an action into a scale-corrected command. Every coordinate goes
/// through the coordinate mapper on both axes.
pub fn translate(action: &Action, scale: ScaleFactor) -> Translation {
    let command = match action {
        Action::Screenshot => return Translation::Recapture,
        Action::Click { kind, at } => InputCommand::Click {
            kind: *kind,
            at: point_to_logical(*at, scale),
        },
        Action::Move { to } => InputCommand::MoveCursor {
            to: point_to_logical(*to, scale),
        },
        Action::Type { text } => InputCommand::Paste { text: text.clone() },
        Action::Key { spec } => match &spec.target {
            KeyTarget::Code(code) => InputCommand::KeyCode {
                code: *code,
                modifiers: spec.modifiers,
            },
            KeyTarget::Literal(text) => InputCommand::Keystroke {
                text: text.clone(),
                modifiers: spec.modifiers,
            },
        },
        Action::Scroll {
            at,
            direction,
            amount,
        } => InputCommand::Scroll {
            at: point_to_logical(*at, scale),
            direction: *direction,
            amount: *amount,
        },
    };
    Translation::Command(command)
}

/// Fixed-format description for the activity log. Cosmetic only.
pub fn describe(action: &Action) -> String {
    match action {
        Action::Click {
            kind: ClickKind::Left,
            at,
        } => format!("Click at {at}"),
        Action::Click {
            kind: ClickKind::Right,
            at,
        } => format!("Right-click at {at}"),
        Action::Click {
            kind: ClickKind::Double,
            at,
        } => format!("Double-click at {at}"),
        Action::Move { to } => format!("Move mouse to {to}"),
        Action::Type { text } => format!("Type: \"{}\"", truncate(text, DESCRIBE_TEXT_LIMIT)),
        Action::Key { spec } => format!("Key: {}", spec.raw),
        Action::Scroll { at, direction, .. } => {
            format!("Scroll {} at {at}", direction.as_str())
        }
        Action::Screenshot => "Take screenshot".to_string(),
    }
}

/// Keeps at most `limit` characters, appending `…` when anything was cut.
pub fn truncate(text: &str, limit: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(limit).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}
