//! Configuration surface for remote MCP tool servers.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which rmcp client transport a server is reached over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum McpTransport {
    /// Streamable HTTP: one persistent streaming channel per session
    #[default]
    StreamableHttp,
    /// Server-sent events: a server-push event stream plus a POST endpoint
    Sse,
}

impl std::fmt::Display for McpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StreamableHttp => f.write_str("streamable_http"),
            Self::Sse => f.write_str("sse"),
        }
    }
}

/// Bounded retry for the network portion of remote calls.
///
/// `max_retries` counts re-attempts after the first try, so the total number
/// of attempts is `max_retries + 1`. The inter-attempt delay is fixed, not
/// exponential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

impl RetryPolicy {
    /// Total number of attempts this policy allows.
    pub fn attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// The fixed delay slept between attempts.
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// A policy that gives up after the first failure.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            delay_ms: 0,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            delay_ms: default_delay_ms(),
        }
    }
}

fn default_max_retries() -> u32 {
    2
}

fn default_delay_ms() -> u64 {
    1_000
}

/// One `[[mcp_servers]]` entry: where a server lives and which of its tools
/// may be registered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpServerConfig {
    /// Name the server's tools are attributed to in logs and errors
    pub name: String,

    /// Endpoint URL (the `/mcp` or `/sse` route, depending on transport)
    pub url: String,

    #[serde(default)]
    pub transport: McpTransport,

    #[serde(default)]
    pub retry: RetryPolicy,

    /// Only register these remote tools (must not overlap with `deny`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow: Option<Vec<String>>,

    /// Register everything except these
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deny: Option<Vec<String>>,
}
