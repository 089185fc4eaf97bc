use action_primitives::{ActionError, ClickKind, InputPort, Modifiers, ScrollDirection};
use async_trait::async_trait;
use deskpilot_core_types::LogicalPoint;

use super::osascript::{
    click_script, key_code_script, keystroke_script, move_cursor_script, run_script,
    scroll_script,
};

/// Input injection through System Events. Needs the Accessibility grant.
#[derive(Debug, Default, Clone)]
pub struct OsascriptInput;

#[async_trait]
impl InputPort for OsascriptInput {
    async fn click(&self, at: LogicalPoint, kind: ClickKind) -> Result<(), ActionError> {
        run_script(&click_script(at, kind)).await.map(drop)
    }

    async fn move_cursor(&self, to: LogicalPoint) -> Result<(), ActionError> {
        run_script(&move_cursor_script(to)).await.map(drop)
    }

    async fn key_code(&self, code: u16, modifiers: Modifiers) -> Result<(), ActionError> {
        run_script(&key_code_script(code, modifiers)).await.map(drop)
    }

    async fn keystroke(&self, text: &str, modifiers: Modifiers) -> Result<(), ActionError> {
        run_script(&keystroke_script(text, modifiers)).await.map(drop)
    }

    // System Events has no point-targeted wheel event; the point only picks the
    // frontmost window the model is looking at.
    async fn scroll_at(
        &self,
        _at: LogicalPoint,
        direction: ScrollDirection,
        amount: u32,
    ) -> Result<(), ActionError> {
        run_script(&scroll_script(direction, amount)).await.map(drop)
    }
}
