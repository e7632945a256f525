//! Error types for the Pincer domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Pincer operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Reasoner errors ---
    #[error("Reasoner error: {0}")]
    Reasoner(#[from] ReasonerError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Memory errors ---
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    // --- Remote tool server errors ---
    #[error("MCP error: {0}")]
    Mcp(#[from] McpError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Cooperative cancellation ---
    #[error("Execution interrupted")]
    Interrupted,

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ReasonerError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by backend: {0}")]
    RateLimited(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Malformed reply: {0}")]
    MalformedReply(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),
}

/// Failures talking to a remote MCP tool server.
///
/// `Unavailable` is the network family (connection refused/reset, handshake
/// failure, transport drop) and is the only retried kind; `Protocol` covers
/// well-formed rejections from the remote side and is surfaced immediately.
#[derive(Debug, Clone, Error)]
pub enum McpError {
    #[error("server '{server}' unavailable after {attempts} attempt(s): {last_error}")]
    Unavailable {
        server: String,
        attempts: u32,
        last_error: String,
    },

    #[error("protocol error from server '{server}': {message}")]
    Protocol { server: String, message: String },

    #[error("remote tool '{name}' not found on server '{server}'")]
    ToolNotFound { server: String, name: String },
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("Schema derivation failed: {0}")]
    SchemaDerivation(String),
}
