//! Agent trait — the composable conversational surface.
//!
//! Pipelines, hubs, and the interruptible executor all operate on this trait
//! so they never care whether the participant is a reasoning engine, a human
//! proxy, or a test double.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::message::{Message, MessageInput};

#[async_trait]
pub trait Agent: Send + Sync {
    /// The agent's display name, used as the sender of its messages.
    fn name(&self) -> &str;

    /// Take input and produce a reply.
    async fn reply(&self, input: MessageInput) -> Result<Message>;

    /// Cancellable variant of [`reply`](Agent::reply).
    ///
    /// Implementations that observe the token return
    /// [`Error::Interrupted`](crate::Error::Interrupted) once cancellation is
    /// seen at a suspension point. The default ignores the token.
    async fn reply_cancellable(
        &self,
        input: MessageInput,
        _cancel: CancellationToken,
    ) -> Result<Message> {
        self.reply(input).await
    }

    /// Take input without replying, e.g. a broadcast from another agent.
    async fn observe(&self, input: MessageInput) -> Result<()>;

    /// Handle an interruption of an in-flight reply.
    ///
    /// Receives the input that was being processed and produces the terminal
    /// message for that turn. The default produces a stock message marked
    /// with `interrupted` metadata.
    async fn on_interrupt(&self, _pending: MessageInput) -> Result<Message> {
        Ok(
            Message::assistant(self.name(), "(interrupted before a reply was produced)")
                .with_metadata("interrupted", serde_json::Value::Bool(true)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ParrotAgent;

    #[async_trait]
    impl Agent for ParrotAgent {
        fn name(&self) -> &str {
            "parrot"
        }

        async fn reply(&self, input: MessageInput) -> Result<Message> {
            let text = input
                .into_vec()
                .last()
                .and_then(|m| m.text_content())
                .unwrap_or_default();
            Ok(Message::assistant(self.name(), text))
        }

        async fn observe(&self, _input: MessageInput) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn default_on_interrupt_marks_metadata() {
        let agent = ParrotAgent;
        let msg = agent.on_interrupt(MessageInput::None).await.unwrap();
        assert!(msg.is_interrupted());
        assert_eq!(msg.sender, "parrot");
    }

    #[tokio::test]
    async fn default_reply_cancellable_ignores_token() {
        let agent = ParrotAgent;
        let token = CancellationToken::new();
        token.cancel();
        let msg = agent
            .reply_cancellable(Message::user("u", "echo me").into(), token)
            .await
            .unwrap();
        assert_eq!(msg.text_content().as_deref(), Some("echo me"));
    }
}
