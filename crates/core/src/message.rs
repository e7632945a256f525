//! Message domain types.
//!
//! These are the core value objects that flow through the entire system:
//! user input becomes a [`Message`], the reasoner replies with one, tool
//! results are appended as more of them. Content is either plain text or a
//! list of typed blocks so tool calls and their results ride alongside text
//! in the same transcript.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tool::ToolCall;

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The AI assistant
    Assistant,
    /// System instructions and tool results
    System,
}

/// A typed unit of message content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text
    Text { text: String },

    /// A tool invocation requested by the assistant
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },

    /// The outcome of a tool invocation, paired to its request by `id`
    ToolResult {
        id: String,
        name: String,
        output: Vec<ContentBlock>,
    },

    /// An image referenced by URL (may be a `data:` URL)
    Image { url: String },
}

impl ContentBlock {
    /// Shorthand for a text block.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

/// Message content — a plain string or a list of typed blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

impl From<String> for MessageContent {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for MessageContent {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<Vec<ContentBlock>> for MessageContent {
    fn from(blocks: Vec<ContentBlock>) -> Self {
        Self::Blocks(blocks)
    }
}

/// A single message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: String,

    /// Display name of whoever produced this message
    pub sender: String,

    /// Conversational role
    pub role: Role,

    /// The content
    pub content: MessageContent,

    /// Optional metadata (interruption flags, usage info, etc.)
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a message with an explicit role.
    pub fn new(sender: impl Into<String>, content: impl Into<MessageContent>, role: Role) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sender: sender.into(),
            role,
            content: content.into(),
            metadata: serde_json::Map::new(),
            timestamp: Utc::now(),
        }
    }

    /// Create a new user message.
    pub fn user(sender: impl Into<String>, content: impl Into<MessageContent>) -> Self {
        Self::new(sender, content, Role::User)
    }

    /// Create a new assistant message.
    pub fn assistant(sender: impl Into<String>, content: impl Into<MessageContent>) -> Self {
        Self::new(sender, content, Role::Assistant)
    }

    /// Create a new system message.
    pub fn system(sender: impl Into<String>, content: impl Into<MessageContent>) -> Self {
        Self::new(sender, content, Role::System)
    }

    /// Attach a metadata entry, builder-style.
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// The content as a list of blocks. Plain text becomes a single text block.
    pub fn blocks(&self) -> Vec<ContentBlock> {
        match &self.content {
            MessageContent::Text(text) => vec![ContentBlock::text(text.clone())],
            MessageContent::Blocks(blocks) => blocks.clone(),
        }
    }

    /// Concatenated text of all text content, if any.
    pub fn text_content(&self) -> Option<String> {
        match &self.content {
            MessageContent::Text(text) => Some(text.clone()),
            MessageContent::Blocks(blocks) => {
                let parts: Vec<&str> = blocks
                    .iter()
                    .filter_map(|b| match b {
                        ContentBlock::Text { text } => Some(text.as_str()),
                        _ => None,
                    })
                    .collect();
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.concat())
                }
            }
        }
    }

    /// All tool-use blocks in this message, as dispatchable calls.
    pub fn tool_uses(&self) -> Vec<ToolCall> {
        match &self.content {
            MessageContent::Text(_) => Vec::new(),
            MessageContent::Blocks(blocks) => blocks
                .iter()
                .filter_map(|b| match b {
                    ContentBlock::ToolUse { id, name, input } => Some(ToolCall {
                        id: id.clone(),
                        name: name.clone(),
                        arguments: input.clone(),
                    }),
                    _ => None,
                })
                .collect(),
        }
    }

    /// Whether this message carries the `interrupted` metadata flag.
    pub fn is_interrupted(&self) -> bool {
        self.metadata
            .get("interrupted")
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }
}

/// Input accepted anywhere a message, a batch of messages, or nothing at all
/// can be supplied. `None` resumes from whatever is already in the context.
#[derive(Debug, Clone)]
pub enum MessageInput {
    None,
    Message(Message),
    Messages(Vec<Message>),
}

impl MessageInput {
    /// Flatten into a plain list of messages.
    pub fn into_vec(self) -> Vec<Message> {
        match self {
            Self::None => Vec::new(),
            Self::Message(msg) => vec![msg],
            Self::Messages(msgs) => msgs,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl From<Message> for MessageInput {
    fn from(msg: Message) -> Self {
        Self::Message(msg)
    }
}

impl From<Vec<Message>> for MessageInput {
    fn from(msgs: Vec<Message>) -> Self {
        Self::Messages(msgs)
    }
}

impl From<Option<Message>> for MessageInput {
    fn from(msg: Option<Message>) -> Self {
        match msg {
            Some(m) => Self::Message(m),
            None => Self::None,
        }
    }
}
