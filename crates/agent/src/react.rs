//! The Reason + Act engine.
//!
//! One `reply` turn alternates between asking the reasoner what to do and
//! dispatching the tool calls it requests, accumulating everything in the
//! shared context store so the next reasoning step sees every prior outcome.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use pincer_core::{
    Agent, ContentBlock, ContextStore, Error, Message, MessageInput, Reasoner, ReasonerReply,
    ReasonerRequest, Result, ToolCall, ToolResponse, Toolkit,
};

/// Appended to the final request when the iteration budget runs out. Sent to
/// the reasoner only, never stored in the context.
const SUMMARY_HINT: &str = "You have run out of reasoning steps without \
    producing a final answer. Respond directly now: summarize the situation \
    and give your best answer. Do not request any more tools.";

/// Terminal reply produced by the interrupt handler.
const INTERRUPT_REPLY: &str =
    "I noticed that you interrupted me and have stopped. What should I do instead?";

/// An agent that drives the reasoning loop.
///
/// Each reasoning step sends the system prompt, the full context, and the
/// current tool catalog to the reasoner. A reply without tool requests ends
/// the turn; otherwise every requested call is dispatched in order through
/// the [`Toolkit`] and its outcome appended to the context before the loop
/// continues. When the iteration budget is exhausted the engine makes one
/// last call with tool use disabled to force a summary.
pub struct ReactAgent {
    name: String,
    system_prompt: String,
    reasoner: Arc<dyn Reasoner>,
    toolkit: Arc<Toolkit>,
    context: Arc<dyn ContextStore>,
    max_iterations: usize,
}

impl ReactAgent {
    pub fn new(
        name: impl Into<String>,
        system_prompt: impl Into<String>,
        reasoner: Arc<dyn Reasoner>,
        toolkit: Arc<Toolkit>,
        context: Arc<dyn ContextStore>,
    ) -> Self {
        Self {
            name: name.into(),
            system_prompt: system_prompt.into(),
            reasoner,
            toolkit,
            context,
            max_iterations: 10,
        }
    }

    /// Set the maximum number of reason/act iterations per turn.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// The toolkit this engine dispatches through.
    pub fn toolkit(&self) -> &Arc<Toolkit> {
        &self.toolkit
    }

    async fn run_loop(
        &self,
        input: MessageInput,
        cancel: Option<&CancellationToken>,
    ) -> Result<Message> {
        self.context.add(input).await?;
        info!(
            agent = %self.name,
            max_iterations = self.max_iterations,
            "reasoning loop starting"
        );

        for iteration in 1..=self.max_iterations {
            debug!(agent = %self.name, iteration, "reasoning");
            let reply = self.reasoning(cancel).await?;

            let calls = reply.tool_uses();
            if calls.is_empty() {
                debug!(agent = %self.name, iteration, "reply carries no tool requests, done");
                return Ok(reply);
            }

            debug!(agent = %self.name, iteration, requested = calls.len(), "acting");
            for call in &calls {
                // A dispatch already in flight always completes; the token is
                // only consulted between dispatches.
                if let Some(token) = cancel
                    && token.is_cancelled()
                {
                    return Err(Error::Interrupted);
                }
                let response = self.acting(call).await?;
                if response.is_interrupted {
                    debug!(agent = %self.name, tool = %call.name, "tool reported an interruption");
                    return Err(Error::Interrupted);
                }
            }
        }

        self.summarize(cancel).await
    }

    /// One reasoning step: full context plus the current tool catalog.
    async fn reasoning(&self, cancel: Option<&CancellationToken>) -> Result<Message> {
        let tools = self.toolkit.definitions().await;
        let request = ReasonerRequest::new(self.request_messages().await?, tools);
        let reply = self.call_reasoner(request, cancel).await?;
        self.record_reply(reply).await
    }

    /// One acting step: dispatch the call and append its outcome to the
    /// context as a system message carrying the paired result block.
    async fn acting(&self, call: &ToolCall) -> Result<ToolResponse> {
        debug!(agent = %self.name, tool = %call.name, call_id = %call.id, "dispatching tool request");
        let response = self.toolkit.invoke(call).await;

        let result = Message::system(
            "system",
            vec![ContentBlock::ToolResult {
                id: call.id.clone(),
                name: call.name.clone(),
                output: response.content.clone(),
            }],
        );
        self.context.add(result.into()).await?;
        Ok(response)
    }

    /// The final forced step: one more reasoner call with tool use disabled
    /// and an explicit instruction to answer.
    async fn summarize(&self, cancel: Option<&CancellationToken>) -> Result<Message> {
        warn!(
            agent = %self.name,
            max_iterations = self.max_iterations,
            "iteration budget exhausted, forcing a summary"
        );
        let mut messages = self.request_messages().await?;
        messages.push(Message::user("system", SUMMARY_HINT));
        let reply = self
            .call_reasoner(ReasonerRequest::without_tools(messages), cancel)
            .await?;
        self.record_reply(reply).await
    }

    /// System prompt followed by everything in the context store.
    async fn request_messages(&self) -> Result<Vec<Message>> {
        let mut messages = vec![Message::system(
            self.name.clone(),
            self.system_prompt.clone(),
        )];
        messages.extend(self.context.all().await?);
        Ok(messages)
    }

    async fn call_reasoner(
        &self,
        request: ReasonerRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<ReasonerReply> {
        match cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(Error::Interrupted),
                    reply = self.reasoner.reply(request) => Ok(reply?),
                }
            }
            None => Ok(self.reasoner.reply(request).await?),
        }
    }

    /// Restate the reply under this agent's name and append it to the
    /// context. Token usage rides along as metadata when reported.
    async fn record_reply(&self, reply: ReasonerReply) -> Result<Message> {
        let mut message = Message::assistant(self.name.clone(), reply.message.content);
        if let Some(usage) = reply.usage {
            message = message.with_metadata("usage", serde_json::to_value(usage)?);
        }
        self.context.add(message.clone().into()).await?;
        Ok(message)
    }
}

#[async_trait]
impl Agent for ReactAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn reply(&self, input: MessageInput) -> Result<Message> {
        self.run_loop(input, None).await
    }

    async fn reply_cancellable(
        &self,
        input: MessageInput,
        cancel: CancellationToken,
    ) -> Result<Message> {
        self.run_loop(input, Some(&cancel)).await
    }

    async fn observe(&self, input: MessageInput) -> Result<()> {
        self.context.add(input).await?;
        Ok(())
    }

    /// Record the input that was in flight, then close the turn with a
    /// terminal message marked as interrupted. The store drops duplicate ids,
    /// so it is fine when the loop already appended the input.
    async fn on_interrupt(&self, pending: MessageInput) -> Result<Message> {
        self.context.add(pending).await?;
        let message = Message::assistant(self.name.clone(), INTERRUPT_REPLY)
            .with_metadata("interrupted", serde_json::Value::Bool(true));
        self.context.add(message.clone().into()).await?;
        Ok(message)
    }
}
