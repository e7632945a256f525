//! Local bindings for remote tools.
//!
//! A [`RemoteTool`] is an ordinary [`Tool`] whose body delegates to an
//! [`McpClient`]; once registered it is indistinguishable from a local tool
//! to the reasoning loop, and its failures are absorbed into the transcript
//! the same way.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use pincer_core::{Error, Result, Tool, ToolError, ToolResponse, Toolkit};

use crate::client::{McpClient, RemoteToolEntry};

/// A registered binding that forwards invocations to a remote server.
pub struct RemoteTool {
    client: Arc<McpClient>,
    name: String,
    description: String,
    parameters: Value,
}

impl RemoteTool {
    pub fn new(client: Arc<McpClient>, entry: RemoteToolEntry) -> Self {
        Self {
            client,
            name: entry.name,
            description: entry.description,
            parameters: entry.parameters,
        }
    }

    /// The server this binding delegates to.
    pub fn server(&self) -> &str {
        self.client.name()
    }
}

#[async_trait]
impl Tool for RemoteTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> Value {
        self.parameters.clone()
    }

    async fn execute(&self, arguments: Value) -> std::result::Result<ToolResponse, ToolError> {
        // The remote schema is authoritative; arguments pass through
        // unvalidated and the server rejects what it cannot bind.
        let arguments = match arguments {
            Value::Null => None,
            Value::Object(map) if map.is_empty() => None,
            Value::Object(map) => Some(map),
            other => {
                return Err(ToolError::InvalidArguments(format!(
                    "expected a JSON object, got {other}"
                )));
            }
        };

        let blocks = self
            .client
            .call(&self.name, arguments)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: self.name.clone(),
                reason: e.to_string(),
            })?;
        Ok(ToolResponse::new(blocks))
    }
}

/// Fetch a server's catalog and register one [`RemoteTool`] per surviving
/// entry, returning how many were registered.
///
/// `allow` keeps only the named tools; `deny` drops the named tools. Naming
/// a tool in both lists is contradictory and is rejected as a configuration
/// error before anything is registered.
pub async fn register_remote_tools(
    toolkit: &Toolkit,
    client: Arc<McpClient>,
    allow: Option<&[String]>,
    deny: Option<&[String]>,
) -> Result<usize> {
    if let (Some(allow), Some(deny)) = (allow, deny) {
        let overlap: Vec<&str> = allow
            .iter()
            .filter(|name| deny.contains(name))
            .map(String::as_str)
            .collect();
        if !overlap.is_empty() {
            return Err(Error::Config {
                message: format!(
                    "allow and deny filters for server '{}' overlap on: {}",
                    client.name(),
                    overlap.join(", ")
                ),
            });
        }
    }

    let catalog = client.list_catalog().await?;
    let mut registered = 0;
    for entry in catalog {
        if let Some(allow) = allow
            && !allow.iter().any(|name| *name == entry.name)
        {
            debug!(server = %client.name(), tool = %entry.name, "not in allow list, skipped");
            continue;
        }
        if let Some(deny) = deny
            && deny.iter().any(|name| *name == entry.name)
        {
            debug!(server = %client.name(), tool = %entry.name, "in deny list, skipped");
            continue;
        }
        toolkit
            .register(Arc::new(RemoteTool::new(client.clone(), entry)))
            .await;
        registered += 1;
    }

    info!(
        server = %client.name(),
        registered,
        "remote tools registered"
    );
    Ok(registered)
}
