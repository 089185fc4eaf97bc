use async_trait::async_trait;
use deskpilot_core_types::LogicalPoint;

use crate::errors::ActionError;
use crate::keys::Modifiers;
use crate::types::{ClickKind, ScrollDirection};

/// Raw input-injection primitives. Coordinates are already in logical space.
#[async_trait]
pub trait InputPort: Send + Sync {
    async fn click(&self, at: LogicalPoint, kind: ClickKind) -> Result<(), ActionError>;
    async fn move_cursor(&self, to: LogicalPoint) -> Result<(), ActionError>;
    async fn key_code(&self, code: u16, modifiers: Modifiers) -> Result<(), ActionError>;
    async fn keystroke(&self, text: &str, modifiers: Modifiers) -> Result<(), ActionError>;
    /// Element-directed wheel scroll at a point.
    async fn scroll_at(
        &self,
        at: LogicalPoint,
        direction: ScrollDirection,
        amount: u32,
    ) -> Result<(), ActionError>;
}

#[async_trait]
pub trait ClipboardPort: Send + Sync {
    async fn read_text(&self) -> Result<Option<String>, ActionError>;
    async fn write_text(&self, text: &str) -> Result<(), ActionError>;
}
