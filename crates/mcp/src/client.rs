//! Stateless MCP client built on ephemeral sessions.
//!
//! Every `list_catalog`/`call` opens a fresh session (transport open +
//! initialize handshake), performs exactly one operation, and closes the
//! session again; no connection state is held between calls, so every call
//! is independently recoverable. The network portion of each operation is
//! retried under a bounded [`RetryPolicy`]; protocol errors surface
//! immediately.

use std::time::Duration;

use rmcp::model::CallToolRequestParam;
use rmcp::service::{RoleClient, RunningService, ServiceError, ServiceExt};
use rmcp::transport::{SseClientTransport, StreamableHttpClientTransport};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use pincer_core::{ContentBlock, McpError};

use crate::config::{McpServerConfig, McpTransport, RetryPolicy};
use crate::convert::blocks_from_call_result;

/// How long session establishment (transport open + initialize) may take.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(30);

/// How long a catalog listing may take once the session is up.
const LIST_TIMEOUT: Duration = Duration::from_secs(30);

/// How long a remote invocation may take once the request has been issued.
const CALL_TIMEOUT: Duration = Duration::from_secs(300);

type Session = RunningService<RoleClient, ()>;

/// A remote tool as advertised by the server's catalog.
#[derive(Debug, Clone)]
pub struct RemoteToolEntry {
    pub name: String,
    pub description: String,
    /// JSON-Schema object straight off the wire (`properties`/`required`)
    pub parameters: Value,
}

/// Classification of a failed remote operation. Only the network family is
/// ever retried; a well-formed rejection from the server would fail the same
/// way again.
enum RemoteFailure {
    Network(String),
    Protocol(String),
}

fn classify(error: ServiceError) -> RemoteFailure {
    match error {
        // A JSON-RPC error produced by the server itself
        ServiceError::McpError(data) => RemoteFailure::Protocol(data.to_string()),
        // Everything else is transport-level: connection refused/reset,
        // dropped stream, in-flight timeout
        other => RemoteFailure::Network(other.to_string()),
    }
}

/// Client for one remote MCP tool server.
///
/// Construction is cheap and never touches the network; the catalog is
/// fetched lazily on first use and cached until [`invalidate_catalog`]
/// (concurrent first fetches are serialized by the cache lock).
///
/// [`invalidate_catalog`]: McpClient::invalidate_catalog
pub struct McpClient {
    name: String,
    url: String,
    transport: McpTransport,
    retry: RetryPolicy,
    catalog: Mutex<Option<Vec<RemoteToolEntry>>>,
}

impl McpClient {
    /// A client for the server at `url` with the default transport
    /// (streamable HTTP) and retry policy.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            transport: McpTransport::default(),
            retry: RetryPolicy::default(),
            catalog: Mutex::new(None),
        }
    }

    /// Build a client from an `[[mcp_servers]]` config entry.
    pub fn from_config(config: &McpServerConfig) -> Self {
        Self::new(&config.name, &config.url)
            .with_transport(config.transport)
            .with_retry(config.retry)
    }

    pub fn with_transport(mut self, transport: McpTransport) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// The remote tool catalog, fetched on first use and cached.
    ///
    /// The whole fetch (session + listing) is idempotent, so it is retried
    /// as a unit on network failure, up to the policy's attempt budget.
    pub async fn list_catalog(&self) -> Result<Vec<RemoteToolEntry>, McpError> {
        let mut cached = self.catalog.lock().await;
        if let Some(entries) = cached.as_ref() {
            return Ok(entries.clone());
        }

        let mut last_error = String::new();
        for attempt in 1..=self.retry.attempts() {
            if attempt > 1 {
                tokio::time::sleep(self.retry.delay()).await;
            }
            match self.fetch_catalog_once().await {
                Ok(entries) => {
                    info!(
                        server = %self.name,
                        tools = entries.len(),
                        "remote tool catalog fetched"
                    );
                    *cached = Some(entries.clone());
                    return Ok(entries);
                }
                Err(RemoteFailure::Protocol(message)) => {
                    return Err(McpError::Protocol {
                        server: self.name.clone(),
                        message,
                    });
                }
                Err(RemoteFailure::Network(message)) => {
                    warn!(
                        server = %self.name,
                        attempt,
                        error = %message,
                        "catalog fetch failed"
                    );
                    last_error = message;
                }
            }
        }

        Err(McpError::Unavailable {
            server: self.name.clone(),
            attempts: self.retry.attempts(),
            last_error,
        })
    }

    /// Drop the cached catalog so the next use refetches it.
    pub async fn invalidate_catalog(&self) {
        let mut cached = self.catalog.lock().await;
        *cached = None;
    }

    /// Invoke a remote tool and translate its result content.
    ///
    /// The name is resolved against the cached catalog (fetching it first if
    /// needed); an unknown name is the caller's mistake and is not retried.
    /// Only session establishment is retried: a failure there is confirmed
    /// to precede any remote execution. Once the in-session request has been
    /// issued, a transport failure is ambiguous (the remote side may have
    /// executed) and surfaces as `Unavailable` without re-execution.
    pub async fn call(
        &self,
        name: &str,
        arguments: Option<serde_json::Map<String, Value>>,
    ) -> Result<Vec<ContentBlock>, McpError> {
        let catalog = self.list_catalog().await?;
        if !catalog.iter().any(|entry| entry.name == name) {
            return Err(McpError::ToolNotFound {
                server: self.name.clone(),
                name: name.to_string(),
            });
        }

        let mut last_error = String::new();
        for attempt in 1..=self.retry.attempts() {
            if attempt > 1 {
                tokio::time::sleep(self.retry.delay()).await;
            }

            let session = match self.open_session().await {
                Ok(session) => session,
                Err(RemoteFailure::Protocol(message)) => {
                    return Err(McpError::Protocol {
                        server: self.name.clone(),
                        message,
                    });
                }
                Err(RemoteFailure::Network(message)) => {
                    warn!(
                        server = %self.name,
                        tool = %name,
                        attempt,
                        error = %message,
                        "session establishment failed"
                    );
                    last_error = message;
                    continue;
                }
            };

            debug!(server = %self.name, tool = %name, "invoking remote tool");
            let outcome = tokio::time::timeout(
                CALL_TIMEOUT,
                session.call_tool(CallToolRequestParam {
                    name: name.to_string().into(),
                    arguments: arguments.clone(),
                }),
            )
            .await;
            // The session is closed before the outcome is inspected so a
            // failed invocation can never leak a half-open connection.
            let _ = session.cancel().await;

            return match outcome {
                Ok(Ok(result)) => Ok(blocks_from_call_result(result)),
                Ok(Err(error)) => match classify(error) {
                    RemoteFailure::Protocol(message) => Err(McpError::Protocol {
                        server: self.name.clone(),
                        message,
                    }),
                    RemoteFailure::Network(message) => Err(McpError::Unavailable {
                        server: self.name.clone(),
                        attempts: attempt,
                        last_error: message,
                    }),
                },
                Err(_) => Err(McpError::Unavailable {
                    server: self.name.clone(),
                    attempts: attempt,
                    last_error: format!(
                        "remote invocation still pending after {CALL_TIMEOUT:?}"
                    ),
                }),
            };
        }

        Err(McpError::Unavailable {
            server: self.name.clone(),
            attempts: self.retry.attempts(),
            last_error,
        })
    }

    /// One complete catalog fetch: session up, list, session down.
    async fn fetch_catalog_once(&self) -> Result<Vec<RemoteToolEntry>, RemoteFailure> {
        let session = self.open_session().await?;
        let listed = tokio::time::timeout(LIST_TIMEOUT, session.list_all_tools()).await;
        let _ = session.cancel().await;

        let tools = match listed {
            Ok(listed) => listed.map_err(classify)?,
            Err(_) => {
                return Err(RemoteFailure::Network(format!(
                    "catalog listing still pending after {LIST_TIMEOUT:?}"
                )));
            }
        };
        Ok(tools
            .into_iter()
            .map(|tool| entry_from_tool(&self.name, tool))
            .collect())
    }

    /// Open a transport and run the initialize handshake.
    async fn open_session(&self) -> Result<Session, RemoteFailure> {
        debug!(
            server = %self.name,
            transport = %self.transport,
            url = %self.url,
            "opening session"
        );
        let handshake = async {
            match self.transport {
                McpTransport::StreamableHttp => {
                    let transport = StreamableHttpClientTransport::from_uri(self.url.clone());
                    ().serve(transport)
                        .await
                        .map_err(|e| RemoteFailure::Network(e.to_string()))
                }
                McpTransport::Sse => {
                    let transport = SseClientTransport::start(self.url.clone())
                        .await
                        .map_err(|e| RemoteFailure::Network(e.to_string()))?;
                    ().serve(transport)
                        .await
                        .map_err(|e| RemoteFailure::Network(e.to_string()))
                }
            }
        };
        match tokio::time::timeout(HANDSHAKE_TIMEOUT, handshake).await {
            Ok(session) => session,
            Err(_) => Err(RemoteFailure::Network(format!(
                "handshake still pending after {HANDSHAKE_TIMEOUT:?}"
            ))),
        }
    }
}

impl std::fmt::Debug for McpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpClient")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("transport", &self.transport)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

fn entry_from_tool(server: &str, tool: rmcp::model::Tool) -> RemoteToolEntry {
    let description = match tool.description.as_deref() {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => format!("Remote tool '{}' from server '{}'", tool.name, server),
    };
    RemoteToolEntry {
        name: tool.name.to_string(),
        description,
        parameters: Value::Object((*tool.input_schema).clone()),
    }
}
