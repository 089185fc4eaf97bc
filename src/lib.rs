//! deskpilot: a desktop agent that looks at the screen, asks a vision model
//! what to do next, and drives the mouse and keyboard until the task is done.
//!
//! Library surface of the CLI package, exposed for integration tests.

pub mod cli;
pub mod host;
pub mod llm;
pub mod settings;

pub use llm::{ClaudeConfig, ClaudeGateway};
pub use settings::{Settings, SettingsStore};
