//! Agent core for the desktop agent.
//!
//! Provides the conversation model, the model gateway contract, token
//! accounting, and the session orchestrator that drives the capture, think,
//! act loop.

pub mod agent_loop;
pub mod errors;
pub mod gateway;
pub mod model;
pub mod usage;

pub use agent_loop::{
    EventHub, LogEntry, LogKind, Session, SessionConfig, SessionEvent, SessionOrchestrator,
    SessionOutcome, SessionPhase, SessionReport,
};
pub use errors::SessionError;
pub use gateway::{
    ComputerTool, GatewayError, ModelGateway, ModelReply, ModelRequest, COMPUTER_TOOL_NAME,
    COMPUTER_TOOL_TYPE, DEFAULT_MAX_TOKENS,
};
pub use model::{ContentBlock, ConversationRole, ConversationTurn, ImageSource};
pub use usage::{format_cost, pricing_for, TokenUsage, DEFAULT_MODEL, PRICING};
