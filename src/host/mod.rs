//! macOS host adapters for the capture and input ports.

pub mod capture;
pub mod clipboard;
pub mod input;
pub mod osascript;
pub mod permissions;

use std::sync::Arc;

use action_primitives::{ActionExecutor, TimingPolicy};

pub use capture::ScreencaptureSource;
pub use clipboard::SystemClipboard;
pub use input::OsascriptInput;

/// Executor wired to System Events input and the system clipboard.
pub fn action_executor(timing: TimingPolicy) -> ActionExecutor {
    ActionExecutor::new(Arc::new(OsascriptInput), Arc::new(SystemClipboard), timing)
}
