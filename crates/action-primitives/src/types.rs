//! Core data types for action primitives

use deskpilot_core_types::{LogicalPoint, PhysicalPoint};
use serde::Deserialize;
use serde_json::Value;

use crate::errors::ActionError;
use crate::keys::{KeySpec, Modifiers};

/// Default wheel magnitude when the model omits `amount`.
pub const DEFAULT_SCROLL_AMOUNT: u32 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClickKind {
    Left,
    Right,
    Double,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScrollDirection {
    Up,
    Down,
}

impl ScrollDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            ScrollDirection::Up => "up",
            ScrollDirection::Down => "down",
        }
    }
}

/// One interaction requested by the model, in physical pixel space.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Click { kind: ClickKind, at: PhysicalPoint },
    Move { to: PhysicalPoint },
    Type { text: String },
    Key { spec: KeySpec },
    Scroll {
        at: PhysicalPoint,
        direction: ScrollDirection,
        amount: u32,
    },
    Screenshot,
}

impl Action {
    /// Wire name of the action, as the model spells it.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Action::Click {
                kind: ClickKind::Left,
                ..
            } => "left_click",
            Action::Click {
                kind: ClickKind::Right,
                ..
            } => "right_click",
            Action::Click {
                kind: ClickKind::Double,
                ..
            } => "double_click",
            Action::Move { .. } => "mouse_move",
            Action::Type { .. } => "type",
            Action::Key { .. } => "key",
            Action::Scroll { .. } => "scroll",
            Action::Screenshot => "screenshot",
        }
    }

    pub fn is_screenshot(&self) -> bool {
        matches!(self, Action::Screenshot)
    }

    /// Decodes the `input` object of a `computer` tool invocation.
    pub fn from_tool_input(input: &Value) -> Result<Self, ActionError> {
        let raw: RawToolInput = serde_json::from_value(input.clone())
            .map_err(|err| ActionError::InvalidInput(err.to_string()))?;

        match raw.action.as_str() {
            "left_click" => Ok(Action::Click {
                kind: ClickKind::Left,
                at: raw.point()?,
            }),
            "right_click" => Ok(Action::Click {
                kind: ClickKind::Right,
                at: raw.point()?,
            }),
            "double_click" => Ok(Action::Click {
                kind: ClickKind::Double,
                at: raw.point()?,
            }),
            "mouse_move" => Ok(Action::Move { to: raw.point()? }),
            "type" => Ok(Action::Type { text: raw.text()? }),
            "key" => Ok(Action::Key {
                spec: KeySpec::parse(&raw.text()?),
            }),
            "scroll" => {
                let direction = match raw.direction.as_deref() {
                    Some("down") => ScrollDirection::Down,
                    Some("up") | None => ScrollDirection::Up,
                    Some(other) => {
                        return Err(ActionError::InvalidInput(format!(
                            "unsupported scroll direction '{other}'"
                        )))
                    }
                };
                Ok(Action::Scroll {
                    at: raw.point()?,
                    direction,
                    amount: raw.amount.unwrap_or(DEFAULT_SCROLL_AMOUNT),
                })
            }
            "screenshot" => Ok(Action::Screenshot),
            other => Err(ActionError::UnsupportedAction(other.to_string())),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawToolInput {
    action: String,
    #[serde(default)]
    coordinate: Option<[i64; 2]>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default, alias = "scroll_direction")]
    direction: Option<String>,
    #[serde(default, alias = "scroll_amount")]
    amount: Option<u32>,
}

impl RawToolInput {
    fn point(&self) -> Result<PhysicalPoint, ActionError> {
        let [x, y] = self.coordinate.ok_or_else(|| {
            ActionError::InvalidInput(format!("'{}' requires a coordinate", self.action))
        })?;
        let convert = |value: i64| {
            i32::try_from(value).map_err(|_| {
                ActionError::InvalidInput(format!("coordinate {value} is out of range"))
            })
        };
        Ok(PhysicalPoint::new(convert(x)?, convert(y)?))
    }

    fn text(&self) -> Result<String, ActionError> {
        self.text.clone().ok_or_else(|| {
            ActionError::InvalidInput(format!("'{}' requires text", self.action))
        })
    }
}

/// A concrete, scale-corrected input-injection command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputCommand {
    Click { kind: ClickKind, at: LogicalPoint },
    MoveCursor { to: LogicalPoint },
    Paste { text: String },
    KeyCode { code: u16, modifiers: Modifiers },
    Keystroke { text: String, modifiers: Modifiers },
    Scroll {
        at: LogicalPoint,
        direction: ScrollDirection,
        amount: u32,
    },
}

/// Translator output: either something to inject, or a request for a fresh
/// capture that the orchestrator handles itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Translation {
    Command(InputCommand),
    Recapture,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_click_variants() {
        let action =
            Action::from_tool_input(&json!({"action": "left_click", "coordinate": [500, 300]}))
                .unwrap();
        assert_eq!(
            action,
            Action::Click {
                kind: ClickKind::Left,
                at: PhysicalPoint::new(500, 300)
            }
        );
        assert_eq!(action.kind_name(), "left_click");

        let double =
            Action::from_tool_input(&json!({"action": "double_click", "coordinate": [1, 2]}))
                .unwrap();
        assert!(matches!(
            double,
            Action::Click {
                kind: ClickKind::Double,
                ..
            }
        ));
    }

    #[test]
    fn scroll_defaults_and_aliases() {
        let action =
            Action::from_tool_input(&json!({"action": "scroll", "coordinate": [10, 20]})).unwrap();
        assert_eq!(
            action,
            Action::Scroll {
                at: PhysicalPoint::new(10, 20),
                direction: ScrollDirection::Up,
                amount: DEFAULT_SCROLL_AMOUNT,
            }
        );

        let aliased = Action::from_tool_input(&json!({
            "action": "scroll",
            "coordinate": [10, 20],
            "scroll_direction": "down",
            "scroll_amount": 5
        }))
        .unwrap();
        assert_eq!(
            aliased,
            Action::Scroll {
                at: PhysicalPoint::new(10, 20),
                direction: ScrollDirection::Down,
                amount: 5,
            }
        );
    }

    #[test]
    fn key_and_type_require_text() {
        let err = Action::from_tool_input(&json!({"action": "type"})).unwrap_err();
        assert!(matches!(err, ActionError::InvalidInput(_)));

        let key = Action::from_tool_input(&json!({"action": "key", "text": "cmd+s"})).unwrap();
        assert_eq!(key.kind_name(), "key");
    }

    #[test]
    fn unknown_actions_are_reported_not_panicked() {
        let err = Action::from_tool_input(&json!({"action": "triple_click", "coordinate": [1, 1]}))
            .unwrap_err();
        assert_eq!(err, ActionError::UnsupportedAction("triple_click".into()));
        assert!(err.is_protocol());
    }

    #[test]
    fn clicks_without_coordinates_are_invalid() {
        let err = Action::from_tool_input(&json!({"action": "left_click"})).unwrap_err();
        assert!(matches!(err, ActionError::InvalidInput(_)));
    }

    #[test]
    fn screenshot_has_no_payload() {
        let action = Action::from_tool_input(&json!({"action": "screenshot"})).unwrap();
        assert!(action.is_screenshot());
    }
}
