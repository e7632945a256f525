//! Interruptible execution of single agent turns.
//!
//! [`InterruptibleAgent`] wraps an [`Agent`] so one in-flight `reply` can be
//! cancelled from outside (another task, a Ctrl+C handler). The wrapped agent
//! observes the signal cooperatively at its suspension points; once it does,
//! the wrapper hands control to the agent's `on_interrupt` handler and
//! returns that handler's message as the turn's result. Callers never see
//! `Error::Interrupted`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use pincer_core::{Agent, Error, Message, MessageInput, Result};

/// Tracks at most one running turn and its cancellation token.
///
/// One turn at a time: a second `run` while one is in flight is rejected.
/// Callers that need concurrent turns use separate instances.
pub struct InterruptibleAgent {
    inner: Arc<dyn Agent>,
    current: Mutex<Option<CancellationToken>>,
    running: AtomicBool,
}

/// Clears the running state when the turn ends, even when the `run` future
/// itself is dropped mid-flight.
struct RunningGuard<'a>(&'a InterruptibleAgent);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        *self.0.current.lock().expect("executor state lock poisoned") = None;
        self.0.running.store(false, Ordering::SeqCst);
    }
}

impl InterruptibleAgent {
    pub fn new(inner: Arc<dyn Agent>) -> Self {
        Self {
            inner,
            current: Mutex::new(None),
            running: AtomicBool::new(false),
        }
    }

    /// Run one turn of the wrapped agent as a cancellable unit.
    ///
    /// On interruption the wrapped agent's `on_interrupt` handler produces
    /// the turn's result; the handler itself is not cancellable. A second
    /// concurrent `run` on the same instance is rejected with an error.
    pub async fn run(&self, input: MessageInput) -> Result<Message> {
        let token = CancellationToken::new();
        {
            let mut current = self.current.lock().expect("executor state lock poisoned");
            if current.is_some() {
                return Err(Error::Internal(format!(
                    "agent '{}' is already executing a turn",
                    self.inner.name()
                )));
            }
            *current = Some(token.clone());
        }
        self.running.store(true, Ordering::SeqCst);
        let _reset = RunningGuard(self);

        let outcome = self.inner.reply_cancellable(input.clone(), token).await;
        match outcome {
            Err(Error::Interrupted) => {
                info!(agent = %self.inner.name(), "turn interrupted, invoking the interrupt handler");
                self.inner.on_interrupt(input).await
            }
            other => other,
        }
    }

    /// Signal the in-flight turn, if any.
    ///
    /// Returns `false` when nothing is running or the current turn was
    /// already signalled. Signalling is asynchronous: the turn stops at its
    /// next suspension point, not necessarily before this returns.
    pub fn interrupt(&self) -> bool {
        let current = self.current.lock().expect("executor state lock poisoned");
        match current.as_ref() {
            Some(token) if !token.is_cancelled() => {
                debug!(agent = %self.inner.name(), "interrupt signalled");
                token.cancel();
                true
            }
            _ => false,
        }
    }

    /// Whether a turn is currently executing. Stays `true` while the
    /// interrupt handler runs.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Agent for InterruptibleAgent {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn reply(&self, input: MessageInput) -> Result<Message> {
        self.run(input).await
    }

    async fn observe(&self, input: MessageInput) -> Result<()> {
        self.inner.observe(input).await
    }

    async fn on_interrupt(&self, pending: MessageInput) -> Result<Message> {
        self.inner.on_interrupt(pending).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::react::ReactAgent;
    use pincer_core::{ContextStore, Reasoner, ReasonerError, ReasonerReply, ReasonerRequest, Toolkit};
    use pincer_memory::InMemoryStore;
    use tokio::sync::Notify;

    /// Stops only when cancelled; gates let the test observe each phase.
    struct GatedAgent {
        reached_reply: Arc<Notify>,
        handler_entered: Arc<Notify>,
        release_handler: Arc<Notify>,
    }

    impl GatedAgent {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                reached_reply: Arc::new(Notify::new()),
                handler_entered: Arc::new(Notify::new()),
                release_handler: Arc::new(Notify::new()),
            })
        }
    }

    #[async_trait]
    impl Agent for GatedAgent {
        fn name(&self) -> &str {
            "gated"
        }

        async fn reply(&self, _input: MessageInput) -> Result<Message> {
            Ok(Message::assistant("gated", "finished"))
        }

        async fn reply_cancellable(
            &self,
            _input: MessageInput,
            cancel: CancellationToken,
        ) -> Result<Message> {
            self.reached_reply.notify_one();
            cancel.cancelled().await;
            Err(Error::Interrupted)
        }

        async fn observe(&self, _input: MessageInput) -> Result<()> {
            Ok(())
        }

        async fn on_interrupt(&self, _pending: MessageInput) -> Result<Message> {
            self.handler_entered.notify_one();
            self.release_handler.notified().await;
            Ok(Message::assistant("gated", "stopped early")
                .with_metadata("interrupted", serde_json::Value::Bool(true)))
        }
    }

    #[tokio::test]
    async fn interruption_lifecycle() {
        let agent = GatedAgent::new();
        let executor = Arc::new(InterruptibleAgent::new(agent.clone()));

        assert!(!executor.is_running());
        assert!(!executor.interrupt());

        let handle = {
            let executor = executor.clone();
            tokio::spawn(async move { executor.run(Message::user("u", "work").into()).await })
        };

        agent.reached_reply.notified().await;
        assert!(executor.is_running());
        assert!(executor.interrupt());
        // the current turn was already signalled
        assert!(!executor.interrupt());

        agent.handler_entered.notified().await;
        assert!(executor.is_running());
        assert!(!executor.interrupt());
        agent.release_handler.notify_one();

        let reply = handle.await.unwrap().unwrap();
        assert!(reply.is_interrupted());
        assert_eq!(reply.text_content().as_deref(), Some("stopped early"));
        assert!(!executor.is_running());
        assert!(!executor.interrupt());
    }

    #[tokio::test]
    async fn concurrent_run_is_rejected() {
        let agent = GatedAgent::new();
        let executor = Arc::new(InterruptibleAgent::new(agent.clone()));

        let handle = {
            let executor = executor.clone();
            tokio::spawn(async move { executor.run(Message::user("u", "first").into()).await })
        };
        agent.reached_reply.notified().await;

        let err = executor.run(MessageInput::None).await.unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
        assert!(err.to_string().contains("already executing"));

        executor.interrupt();
        agent.handler_entered.notified().await;
        agent.release_handler.notify_one();
        handle.await.unwrap().unwrap();

        // the rejected call must not have corrupted the running state
        assert!(!executor.is_running());
    }

    struct ImmediateAgent;

    #[async_trait]
    impl Agent for ImmediateAgent {
        fn name(&self) -> &str {
            "immediate"
        }

        async fn reply(&self, _input: MessageInput) -> Result<Message> {
            Ok(Message::assistant("immediate", "all done"))
        }

        async fn observe(&self, _input: MessageInput) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn normal_completion_passes_through() {
        let executor = InterruptibleAgent::new(Arc::new(ImmediateAgent));

        let reply = executor
            .run(Message::user("u", "quick one").into())
            .await
            .unwrap();

        assert_eq!(reply.text_content().as_deref(), Some("all done"));
        assert!(!reply.is_interrupted());
        assert!(!executor.is_running());
        assert!(!executor.interrupt());
    }

    #[tokio::test]
    async fn executor_is_reusable_across_turns() {
        let executor = InterruptibleAgent::new(Arc::new(ImmediateAgent));

        executor
            .run(Message::user("u", "one").into())
            .await
            .unwrap();
        let reply = executor
            .run(Message::user("u", "two").into())
            .await
            .unwrap();

        assert_eq!(reply.text_content().as_deref(), Some("all done"));
    }

    struct HangingReasoner {
        started: Arc<Notify>,
    }

    #[async_trait]
    impl Reasoner for HangingReasoner {
        fn name(&self) -> &str {
            "hanging"
        }

        async fn reply(
            &self,
            _request: ReasonerRequest,
        ) -> std::result::Result<ReasonerReply, ReasonerError> {
            self.started.notify_one();
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn interrupting_a_reasoning_turn_records_the_interruption() {
        let started = Arc::new(Notify::new());
        let context = Arc::new(InMemoryStore::new());
        let engine = Arc::new(ReactAgent::new(
            "pincer",
            "Slow.",
            Arc::new(HangingReasoner {
                started: started.clone(),
            }),
            Arc::new(Toolkit::new()),
            context.clone(),
        ));
        let executor = Arc::new(InterruptibleAgent::new(engine));

        let handle = {
            let executor = executor.clone();
            tokio::spawn(
                async move { executor.run(Message::user("alice", "long task").into()).await },
            )
        };

        started.notified().await;
        assert!(executor.interrupt());

        let reply = handle.await.unwrap().unwrap();
        assert!(reply.is_interrupted());
        assert_eq!(reply.sender, "pincer");

        // pending input recorded once (duplicate id dropped), then the
        // terminal message
        let transcript = context.all().await.unwrap();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].text_content().as_deref(), Some("long task"));
        assert!(transcript[1].is_interrupted());
    }
}
