//! Tool trait — the abstraction over agent capabilities.
//!
//! Tools are what let the agent act instead of just talk: evaluate an
//! expression, query a knowledge base, call out to a remote server. A tool is
//! a name, a description, a JSON-Schema parameter shape, and an async body.
//! [`FunctionTool`] derives the schema from a declarative parameter list so
//! most tools never write JSON Schema by hand.

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

use crate::error::ToolError;
use crate::message::ContentBlock;
use crate::reasoner::ToolDefinition;

/// A request to invoke a tool, as produced by the reasoner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique call ID; the result is paired back to the request by this
    pub id: String,

    /// Name of the tool to invoke
    pub name: String,

    /// Arguments as a JSON object
    pub arguments: Value,
}

/// The outcome of a tool invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResponse {
    /// Output content blocks (normally text)
    pub content: Vec<ContentBlock>,

    /// Optional structured metadata
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, Value>,

    /// Whether this is the last chunk of the response
    #[serde(default = "default_is_final")]
    pub is_final: bool,

    /// Set when a human/user interruption occurred during execution
    #[serde(default)]
    pub is_interrupted: bool,
}

fn default_is_final() -> bool {
    true
}

impl ToolResponse {
    /// A response carrying the given content blocks.
    pub fn new(content: Vec<ContentBlock>) -> Self {
        Self {
            content,
            metadata: serde_json::Map::new(),
            is_final: true,
            is_interrupted: false,
        }
    }

    /// A response carrying a single text block.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(vec![ContentBlock::text(text)])
    }

    /// A failure outcome. Failures are data: the text is fed back to the
    /// reasoner so it can see and react to what went wrong.
    pub fn failure(message: impl std::fmt::Display) -> Self {
        Self::text(format!("Error: {message}"))
    }

    /// A response marking that execution was interrupted mid-flight.
    pub fn interrupted(text: impl Into<String>) -> Self {
        let mut response = Self::text(text);
        response.is_interrupted = true;
        response
    }

    /// Attach a metadata entry, builder-style.
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Concatenated text of all text blocks, newline-separated.
    pub fn text_content(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .content
            .iter()
            .filter_map(|b| match b {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n"))
        }
    }
}

/// The core Tool trait.
///
/// Each tool (calculator, current_time, remote MCP tools, etc.) implements
/// this trait. Tools are registered in the [`Toolkit`](crate::Toolkit) and
/// made available to the reasoning loop.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "calculator").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the reasoner).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with the given arguments.
    async fn execute(&self, arguments: Value) -> std::result::Result<ToolResponse, ToolError>;

    /// Convert this tool into a ToolDefinition for the reasoner catalog.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// JSON type of a declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl ParamType {
    /// The JSON Schema type name.
    pub fn json_name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    /// Whether a JSON value inhabits this type.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }
}

/// A declared parameter of a [`FunctionTool`].
///
/// A parameter without a default is required; a default both marks the
/// parameter optional and is filled in when the caller omits it.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: String,
    pub param_type: ParamType,
    pub description: String,
    pub default: Option<Value>,
}

impl ParamSpec {
    /// A required parameter.
    pub fn required(
        name: impl Into<String>,
        param_type: ParamType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            param_type,
            description: description.into(),
            default: None,
        }
    }

    /// An optional parameter with a default value.
    pub fn optional(
        name: impl Into<String>,
        param_type: ParamType,
        description: impl Into<String>,
        default: Value,
    ) -> Self {
        Self {
            name: name.into(),
            param_type,
            description: description.into(),
            default: Some(default),
        }
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

type ToolHandler = Arc<
    dyn Fn(serde_json::Map<String, Value>) -> BoxFuture<'static, std::result::Result<ToolResponse, ToolError>>
        + Send
        + Sync,
>;

/// A tool built from a declarative parameter list and an async closure.
///
/// The JSON Schema sent to the reasoner is derived from the [`ParamSpec`]s at
/// build time, so the descriptor and the binding logic can never drift apart.
///
/// ```
/// # use pincer_core::tool::{FunctionTool, ParamSpec, ParamType, ToolResponse};
/// let add = FunctionTool::builder("add", "Add two integers")
///     .param(ParamSpec::required("a", ParamType::Integer, "First addend"))
///     .param(ParamSpec::required("b", ParamType::Integer, "Second addend"))
///     .build(|args| async move {
///         let a = args["a"].as_i64().unwrap_or(0);
///         let b = args["b"].as_i64().unwrap_or(0);
///         Ok(ToolResponse::text((a + b).to_string()))
///     })
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct FunctionTool {
    name: String,
    description: String,
    parameters: Vec<ParamSpec>,
    schema: Value,
    handler: ToolHandler,
}

impl std::fmt::Debug for FunctionTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl FunctionTool {
    /// Start building a function tool.
    pub fn builder(name: impl Into<String>, description: impl Into<String>) -> FunctionToolBuilder {
        FunctionToolBuilder {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }
}

/// Builder for [`FunctionTool`]. Collects parameter specs, validates them,
/// and derives the JSON Schema when `build` is called.
pub struct FunctionToolBuilder {
    name: String,
    description: String,
    parameters: Vec<ParamSpec>,
}

impl FunctionToolBuilder {
    /// Declare a parameter.
    pub fn param(mut self, spec: ParamSpec) -> Self {
        self.parameters.push(spec);
        self
    }

    /// Validate the descriptor, derive the schema, and attach the body.
    ///
    /// Fails with [`ToolError::SchemaDerivation`] when the descriptor cannot
    /// be represented: empty tool name, duplicate parameter names, or a
    /// default whose JSON type contradicts the declared parameter type.
    pub fn build<F, Fut>(self, handler: F) -> std::result::Result<FunctionTool, ToolError>
    where
        F: Fn(serde_json::Map<String, Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<ToolResponse, ToolError>> + Send + 'static,
    {
        if self.name.trim().is_empty() {
            return Err(ToolError::SchemaDerivation(
                "tool name must not be empty".into(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for param in &self.parameters {
            if !seen.insert(param.name.as_str()) {
                return Err(ToolError::SchemaDerivation(format!(
                    "duplicate parameter name '{}' in tool '{}'",
                    param.name, self.name
                )));
            }
            if let Some(default) = &param.default
                && !param.param_type.matches(default)
            {
                return Err(ToolError::SchemaDerivation(format!(
                    "default for parameter '{}' of tool '{}' is not a valid {}",
                    param.name,
                    self.name,
                    param.param_type.json_name()
                )));
            }
        }

        let schema = derive_schema(&self.parameters);

        Ok(FunctionTool {
            name: self.name,
            description: self.description,
            parameters: self.parameters,
            schema,
            handler: Arc::new(move |args| Box::pin(handler(args))),
        })
    }
}

/// Derive the JSON-Schema object shape from a parameter list.
fn derive_schema(parameters: &[ParamSpec]) -> Value {
    let mut properties = serde_json::Map::new();
    let mut required = Vec::new();

    for param in parameters {
        properties.insert(
            param.name.clone(),
            serde_json::json!({
                "type": param.param_type.json_name(),
                "description": param.description,
            }),
        );
        if param.is_required() {
            required.push(Value::String(param.name.clone()));
        }
    }

    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

#[async_trait]
impl Tool for FunctionTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> Value {
        self.schema.clone()
    }

    async fn execute(&self, arguments: Value) -> std::result::Result<ToolResponse, ToolError> {
        let supplied = match arguments {
            Value::Null => serde_json::Map::new(),
            Value::Object(map) => map,
            other => {
                return Err(ToolError::InvalidArguments(format!(
                    "expected a JSON object, got {other}"
                )));
            }
        };

        for key in supplied.keys() {
            if !self.parameters.iter().any(|p| p.name == *key) {
                return Err(ToolError::InvalidArguments(format!(
                    "unknown argument '{key}'"
                )));
            }
        }

        // Bind by name, filling declared defaults for omitted optionals.
        let mut bound = serde_json::Map::new();
        for param in &self.parameters {
            match supplied.get(&param.name) {
                Some(value) => {
                    bound.insert(param.name.clone(), value.clone());
                }
                None => match &param.default {
                    Some(default) => {
                        bound.insert(param.name.clone(), default.clone());
                    }
                    None => {
                        return Err(ToolError::InvalidArguments(format!(
                            "missing required argument '{}'",
                            param.name
                        )));
                    }
                },
            }
        }

        (self.handler)(bound).await
    }
}
