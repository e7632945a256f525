//! # Pincer Core
//!
//! Domain types, traits, and the error taxonomy for the Pincer agent
//! runtime: messages and content blocks, the [`Tool`] contract and
//! [`Toolkit`] registry, the [`Reasoner`] seam, the [`ContextStore`]
//! transcript, and the [`Agent`] trait the engines implement.
//!
//! Every subsystem is defined as a trait here; implementations live in their
//! own crates and depend inward on this one. That keeps the dependency graph
//! a clean fan-in and makes each seam mockable in tests.

pub mod agent;
pub mod context;
pub mod error;
pub mod message;
pub mod reasoner;
pub mod tool;
pub mod toolkit;

// Re-export key types at crate root for ergonomics
pub use agent::Agent;
pub use context::ContextStore;
pub use error::{Error, McpError, MemoryError, ReasonerError, Result, ToolError};
pub use message::{ContentBlock, Message, MessageContent, MessageInput, Role};
pub use reasoner::{Reasoner, ReasonerReply, ReasonerRequest, ToolDefinition, Usage};
pub use tool::{FunctionTool, ParamSpec, ParamType, Tool, ToolCall, ToolResponse};
pub use toolkit::Toolkit;
