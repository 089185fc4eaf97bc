pub mod anthropic;

pub use anthropic::{ClaudeConfig, ClaudeGateway};
