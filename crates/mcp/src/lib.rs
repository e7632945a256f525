//! # Pincer MCP
//!
//! Remote tools over the Model Context Protocol. An [`McpClient`] talks to
//! one server over streamable HTTP or SSE using ephemeral sessions (open,
//! one operation, close) with bounded retry on the network portion;
//! [`register_remote_tools`] translates the server's catalog into registered
//! [`RemoteTool`] bindings so the reasoning loop can call remote tools like
//! any local one.

pub mod client;
pub mod config;
mod convert;
pub mod remote_tool;

pub use client::{McpClient, RemoteToolEntry};
pub use config::{McpServerConfig, McpTransport, RetryPolicy};
pub use pincer_core::McpError;
pub use remote_tool::{register_remote_tools, RemoteTool};
