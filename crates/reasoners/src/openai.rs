//! OpenAI-compatible reasoner implementation.
//!
//! Works with: OpenAI, OpenRouter, Ollama, vLLM, Together AI, Fireworks AI,
//! and any other endpoint exposing a `/v1/chat/completions` route.
//!
//! Non-streaming chat completions with tool use. Conversation messages are
//! reshaped into the wire format on the way out (tool results ride as
//! separate `role: "tool"` messages, tool invocations as `tool_calls` with
//! JSON-string arguments) and replies are parsed back into typed content
//! blocks on the way in.

use async_trait::async_trait;
use pincer_core::error::ReasonerError;
use pincer_core::message::{ContentBlock, Message, Role};
use pincer_core::reasoner::{Reasoner, ReasonerReply, ReasonerRequest, ToolDefinition, Usage};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// An OpenAI-compatible reasoning backend.
///
/// This handles the vast majority of hosted and local models since most
/// expose an OpenAI-compatible chat-completions endpoint.
pub struct OpenAiReasoner {
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    client: reqwest::Client,
}

impl OpenAiReasoner {
    /// Create a new OpenAI-compatible reasoner.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
            client,
        }
    }

    /// Create an OpenAI reasoner (convenience constructor).
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::new("openai", "https://api.openai.com/v1", api_key, model)
    }

    /// Create an Ollama reasoner (convenience constructor).
    pub fn ollama(base_url: Option<&str>, model: impl Into<String>) -> Self {
        Self::new(
            "ollama",
            base_url.unwrap_or("http://localhost:11434/v1"),
            "ollama", // Ollama doesn't need a real key
            model,
        )
    }

    /// Set the sampling temperature, builder-style.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Cap the reply length, builder-style.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// The model requested on each completion.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Convert our Message types to the chat-completions wire format.
    ///
    /// Each `ToolResult` block becomes its own `role: "tool"` message keyed
    /// by `tool_call_id`; text and image blocks become content parts of the
    /// carrying message; `ToolUse` blocks become its `tool_calls`. A message
    /// left with neither content nor tool calls is dropped.
    fn to_wire_messages(messages: &[Message]) -> Vec<WireMessage> {
        let mut wire = Vec::new();

        for message in messages {
            let role = match message.role {
                Role::User => "user",
                Role::Assistant => "assistant",
                Role::System => "system",
            };

            let mut parts = Vec::new();
            let mut tool_calls = Vec::new();

            for block in message.blocks() {
                match block {
                    ContentBlock::Text { text } => {
                        parts.push(ContentPart::Text { text });
                    }
                    ContentBlock::Image { url } => {
                        parts.push(ContentPart::ImageUrl {
                            image_url: ImageUrl { url },
                        });
                    }
                    ContentBlock::ToolUse { id, name, input } => {
                        tool_calls.push(WireToolCall {
                            id,
                            r#type: "function".into(),
                            function: WireFunction {
                                name,
                                arguments: input.to_string(),
                            },
                        });
                    }
                    ContentBlock::ToolResult { id, name, output } => {
                        let text: Vec<&str> = output
                            .iter()
                            .filter_map(|b| match b {
                                ContentBlock::Text { text } => Some(text.as_str()),
                                _ => None,
                            })
                            .collect();

                        wire.push(WireMessage {
                            role: "tool".into(),
                            name: Some(name),
                            content: Some(WireContent::Text(text.join("\n"))),
                            tool_calls: None,
                            tool_call_id: Some(id),
                        });
                    }
                }
            }

            if parts.is_empty() && tool_calls.is_empty() {
                continue;
            }

            wire.push(WireMessage {
                role: role.into(),
                name: Some(message.sender.clone()),
                content: if parts.is_empty() {
                    None
                } else {
                    Some(WireContent::Parts(parts))
                },
                tool_calls: if tool_calls.is_empty() {
                    None
                } else {
                    Some(tool_calls)
                },
                tool_call_id: None,
            });
        }

        wire
    }

    /// Convert tool definitions to the wire format.
    fn to_wire_tools(tools: &[ToolDefinition]) -> Vec<WireToolDefinition> {
        tools
            .iter()
            .map(|t| WireToolDefinition {
                r#type: "function".into(),
                function: WireFunctionDef {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: t.parameters.clone(),
                },
            })
            .collect()
    }

    /// Parse a reply message into content blocks.
    ///
    /// Text content becomes a `Text` block; each `tool_calls` entry becomes a
    /// `ToolUse` block with its JSON-string arguments parsed back into a
    /// value. Empty argument strings count as `{}`, anything else that fails
    /// to parse is a malformed reply.
    fn blocks_from_reply(message: ReplyMessage) -> Result<Vec<ContentBlock>, ReasonerError> {
        let mut blocks = Vec::new();

        if let Some(text) = message.content
            && !text.is_empty()
        {
            blocks.push(ContentBlock::text(text));
        }

        for call in message.tool_calls.unwrap_or_default() {
            let input = if call.function.arguments.trim().is_empty() {
                serde_json::json!({})
            } else {
                serde_json::from_str(&call.function.arguments).map_err(|e| {
                    ReasonerError::MalformedReply(format!(
                        "tool call '{}' carries invalid JSON arguments: {e}",
                        call.function.name
                    ))
                })?
            };

            blocks.push(ContentBlock::ToolUse {
                id: call.id,
                name: call.function.name,
                input,
            });
        }

        Ok(blocks)
    }
}

impl std::fmt::Debug for OpenAiReasoner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiReasoner")
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Reasoner for OpenAiReasoner {
    fn name(&self) -> &str {
        &self.name
    }

    async fn reply(
        &self,
        request: ReasonerRequest,
    ) -> std::result::Result<ReasonerReply, ReasonerError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": Self::to_wire_messages(&request.messages),
            "temperature": self.temperature,
            "stream": false,
        });

        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        if !request.tools.is_empty() {
            body["tools"] = serde_json::json!(Self::to_wire_tools(&request.tools));
        }

        debug!(
            reasoner = %self.name,
            model = %self.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Sending completion request"
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ReasonerError::Timeout(e.to_string())
                } else {
                    ReasonerError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 429 {
            let body = response.text().await.unwrap_or_default();
            warn!(status, "Backend rate limited the request");
            return Err(ReasonerError::RateLimited(if body.is_empty() {
                "too many requests".to_string()
            } else {
                body
            }));
        }

        if status == 401 || status == 403 {
            return Err(ReasonerError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Backend returned error");
            return Err(ReasonerError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ReasonerError::MalformedReply(format!("invalid response body: {e}")))?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ReasonerError::MalformedReply("reply contained no choices".into()))?;

        let blocks = Self::blocks_from_reply(choice.message)?;
        let message = Message::assistant(self.name.clone(), blocks);

        let usage = api_response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(ReasonerReply {
            message,
            usage,
            model: api_response.model,
        })
    }
}

// --- Chat-completions wire types (internal) ---

#[derive(Debug, Serialize)]
struct WireMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    content: Option<WireContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

/// Tool messages carry plain text; everything else carries typed parts.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum WireContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    r#type: String,
    function: WireFunction,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Serialize)]
struct WireToolDefinition {
    r#type: String,
    function: WireFunctionDef,
}

#[derive(Debug, Serialize)]
struct WireFunctionDef {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    model: String,
    choices: Vec<ApiChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}
