use agent_core::{ContentBlock, GatewayError, ModelGateway, ModelReply, ModelRequest, TokenUsage};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_API_BASE: &str = "https://api.anthropic.com/v1";
pub const API_BASE_ENV: &str = "DESKPILOT_API_BASE";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";
/// Opt-in marker for the computer-use tool family.
pub const COMPUTER_USE_BETA: &str = "computer-use-2024-10-22";

#[derive(Debug, Clone)]
pub struct ClaudeConfig {
    pub api_base: String,
    /// Whole-request timeout. `None` waits as long as the server does.
    pub timeout: Option<Duration>,
}

impl Default for ClaudeConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: None,
        }
    }
}

impl ClaudeConfig {
    /// Defaults, with the base URL taken from `DESKPILOT_API_BASE` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(base) = std::env::var(API_BASE_ENV) {
            if !base.trim().is_empty() {
                config.api_base = base.trim().to_string();
            }
        }
        config
    }
}

/// Messages API client for the computer tool.
pub struct ClaudeGateway {
    client: Client,
    config: ClaudeConfig,
}

impl ClaudeGateway {
    pub fn new(config: ClaudeConfig) -> Result<Self, GatewayError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|err| {
            GatewayError::Transport(format!("failed to build HTTP client: {err}"))
        })?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClaudeConfig {
        &self.config
    }
}

#[async_trait]
impl ModelGateway for ClaudeGateway {
    async fn exchange(&self, request: ModelRequest<'_>) -> Result<ModelReply, GatewayError> {
        let url = format!("{}/messages", self.config.api_base.trim_end_matches('/'));
        debug!(%url, model = request.model, turns = request.messages.len(), "claude request");

        let response = self
            .client
            .post(url)
            .header("x-api-key", request.credential)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("anthropic-beta", COMPUTER_USE_BETA)
            .json(&request.to_body())
            .send()
            .await
            .map_err(|err| GatewayError::Transport(format!("claude request failed: {err}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| GatewayError::Transport(format!("claude response unreadable: {err}")))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ClaudeErrorEnvelope>(&text)
                .ok()
                .and_then(|envelope| envelope.error)
                .and_then(|error| error.message)
                .unwrap_or_else(|| format!("API error {}", status.as_u16()));
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let response: ClaudeResponse = serde_json::from_str(&text)
            .map_err(|err| GatewayError::Malformed(format!("claude response invalid: {err}")))?;

        Ok(ModelReply {
            content: response.content,
            usage: response.usage,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: TokenUsage,
}

#[derive(Debug, Deserialize)]
struct ClaudeErrorEnvelope {
    #[serde(default)]
    error: Option<ClaudeErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ClaudeErrorBody {
    #[serde(default)]
    message: Option<String>,
}
