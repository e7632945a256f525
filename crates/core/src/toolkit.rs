//! Toolkit — registration and dispatch of tools.
//!
//! The reasoning loop uses this to:
//! 1. Get tool definitions to send to the reasoner
//! 2. Look up and execute tools when the reasoner requests them
//!
//! Invocation failures are data, not errors: an unknown tool name or a
//! failing tool body produces a textual failure [`ToolResponse`] so the loop
//! keeps running and the reasoner can see and react to what went wrong.

use indexmap::IndexMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::reasoner::ToolDefinition;
use crate::tool::{Tool, ToolCall, ToolResponse};

/// A registry of available tools, iterated in registration order.
pub struct Toolkit {
    tools: RwLock<IndexMap<String, Arc<dyn Tool>>>,
}

impl Toolkit {
    pub fn new() -> Self {
        Self {
            tools: RwLock::new(IndexMap::new()),
        }
    }

    /// Register a tool. Registering under an existing name replaces the prior
    /// binding; the original registration position is retained.
    pub async fn register(&self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        debug!(tool = %name, "registering tool");
        self.tools.write().await.insert(name, tool);
    }

    /// Remove a tool by name. Idempotent; a no-op when absent.
    pub async fn unregister(&self, name: &str) {
        self.tools.write().await.shift_remove(name);
    }

    /// Get all tool definitions in registration order.
    pub async fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .read()
            .await
            .values()
            .map(|t| t.to_definition())
            .collect()
    }

    /// All registered tool names, in registration order.
    pub async fn names(&self) -> Vec<String> {
        self.tools.read().await.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.tools.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tools.read().await.is_empty()
    }

    /// Remove all registered tools.
    pub async fn clear(&self) {
        self.tools.write().await.clear();
    }

    /// Dispatch a tool call.
    ///
    /// Never fails: an unknown name, bad arguments, or an `Err` from the tool
    /// body are all converted into a failure response whose text embeds what
    /// happened. The `Arc` is cloned out of the read guard before awaiting so
    /// a long-running tool never holds the registry lock.
    pub async fn invoke(&self, call: &ToolCall) -> ToolResponse {
        let tool = {
            let tools = self.tools.read().await;
            tools.get(&call.name).cloned()
        };

        let Some(tool) = tool else {
            warn!(tool = %call.name, "tool call for unregistered tool");
            return ToolResponse::failure(format!("tool '{}' not found", call.name));
        };

        debug!(tool = %call.name, call_id = %call.id, "dispatching tool call");
        match tool.execute(call.arguments.clone()).await {
            Ok(response) => response,
            Err(e) => {
                warn!(tool = %call.name, error = %e, "tool execution failed");
                ToolResponse::failure(e)
            }
        }
    }
}

impl Default for Toolkit {
    fn default() -> Self {
        Self::new()
    }
}
