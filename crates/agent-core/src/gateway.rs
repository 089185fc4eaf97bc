//! Model gateway contract: one request/response exchange with the
//! vision-language model.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::model::{ContentBlock, ConversationTurn};
use crate::usage::TokenUsage;

/// Name the single declared tool is registered under.
pub const COMPUTER_TOOL_NAME: &str = "computer";
/// Tool family identifier for the computer tool.
pub const COMPUTER_TOOL_TYPE: &str = "computer_20241022";
/// Fixed output-token cap per exchange.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ComputerTool {
    pub display_width_px: u32,
    pub display_height_px: u32,
}

impl ComputerTool {
    pub fn new(display_width_px: u32, display_height_px: u32) -> Self {
        Self {
            display_width_px,
            display_height_px,
        }
    }

    pub fn to_wire(&self) -> Value {
        json!({
            "type": COMPUTER_TOOL_TYPE,
            "name": COMPUTER_TOOL_NAME,
            "display_width_px": self.display_width_px,
            "display_height_px": self.display_height_px,
        })
    }
}

/// Everything one exchange needs. Borrows the transcript rather than cloning it.
#[derive(Debug, Clone)]
pub struct ModelRequest<'a> {
    pub credential: &'a str,
    pub model: &'a str,
    pub system: &'a str,
    pub tool: ComputerTool,
    pub messages: &'a [ConversationTurn],
    pub max_tokens: u32,
}

impl ModelRequest<'_> {
    /// JSON body of the Messages call.
    pub fn to_body(&self) -> Value {
        json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "system": self.system,
            "tools": [self.tool.to_wire()],
            "messages": self.messages,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelReply {
    pub content: Vec<ContentBlock>,
    pub usage: TokenUsage,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-success status; the message comes from the provider's error object when present.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("malformed model response: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn exchange(&self, request: ModelRequest<'_>) -> Result<ModelReply, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_declares_single_computer_tool() {
        let messages = vec![ConversationTurn::user(vec![ContentBlock::text("hi")])];
        let request = ModelRequest {
            credential: "sk-ant-test",
            model: "claude-haiku-4-5-20251001",
            system: "be careful",
            tool: ComputerTool::new(2560, 1600),
            messages: &messages,
            max_tokens: DEFAULT_MAX_TOKENS,
        };
        let body = request.to_body();

        assert_eq!(body["max_tokens"], 4096);
        assert_eq!(body["tools"].as_array().map(Vec::len), Some(1));
        assert_eq!(body["tools"][0]["type"], "computer_20241022");
        assert_eq!(body["tools"][0]["name"], "computer");
        assert_eq!(body["tools"][0]["display_width_px"], 2560);
        assert_eq!(body["messages"][0]["content"][0]["text"], "hi");
        assert!(body.get("credential").is_none());
    }

    #[test]
    fn api_errors_display_provider_message() {
        let err = GatewayError::Api {
            status: 401,
            message: "invalid x-api-key".into(),
        };
        assert_eq!(err.to_string(), "invalid x-api-key");
    }
}
