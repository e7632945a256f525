//! Reasoner trait — the abstraction over language-model backends.
//!
//! A Reasoner takes the conversation so far plus the tool catalog and
//! produces one reply: either a finished answer or a set of requested tool
//! invocations encoded as `ToolUse` content blocks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ReasonerError;
use crate::message::Message;

/// A tool definition sent to the reasoner so it knows what it can call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool name
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON Schema describing the tool's parameters
    pub parameters: serde_json::Value,
}

/// One reasoning request: the ordered context plus the tool catalog.
#[derive(Debug, Clone)]
pub struct ReasonerRequest {
    /// The conversation messages, oldest first
    pub messages: Vec<Message>,

    /// Tools the reasoner may request; empty disables tool use
    pub tools: Vec<ToolDefinition>,
}

impl ReasonerRequest {
    pub fn new(messages: Vec<Message>, tools: Vec<ToolDefinition>) -> Self {
        Self { messages, tools }
    }

    /// A request with tool use disabled.
    pub fn without_tools(messages: Vec<Message>) -> Self {
        Self {
            messages,
            tools: Vec::new(),
        }
    }
}

/// A complete reply from a reasoner.
#[derive(Debug, Clone)]
pub struct ReasonerReply {
    /// The generated message (assistant role)
    pub message: Message,

    /// Token usage, when the backend reports it
    pub usage: Option<Usage>,

    /// Which model actually replied (may differ from requested)
    pub model: String,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The core Reasoner trait.
///
/// Every language-model backend implements this trait. The reasoning loop
/// calls `reply()` without knowing which backend is in use.
#[async_trait]
pub trait Reasoner: Send + Sync {
    /// A human-readable name for this backend (e.g., "openai").
    fn name(&self) -> &str;

    /// Produce one reply for the given context and tool catalog.
    ///
    /// When `request.tools` is empty, the reply must not contain `ToolUse`
    /// blocks. Backend failures surface as [`ReasonerError`]; a well-formed
    /// refusal is an ordinary reply.
    async fn reply(
        &self,
        request: ReasonerRequest,
    ) -> std::result::Result<ReasonerReply, ReasonerError>;
}
