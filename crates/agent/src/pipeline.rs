//! Combinators for multi-agent flows.
//!
//! The smallest useful orchestration patterns: thread one message through a
//! fixed sequence of agents, loop that sequence for a number of rounds, and
//! a broadcast hub that lets every participant observe what any one of them
//! says.

use std::sync::Arc;

use tracing::debug;

use pincer_core::{Agent, Message, MessageInput, Result};

/// Run `agents` in order, feeding each reply to the next agent.
///
/// Returns the final reply, or `None` when `agents` is empty.
pub async fn sequential_pipeline(
    agents: &[Arc<dyn Agent>],
    input: MessageInput,
) -> Result<Option<Message>> {
    let mut last = None;
    let mut next = input;
    for agent in agents {
        debug!(agent = %agent.name(), "pipeline step");
        let reply = agent.reply(next).await?;
        next = reply.clone().into();
        last = Some(reply);
    }
    Ok(last)
}

/// Run the agent sequence for `rounds` full rounds.
///
/// Replies thread onward across round boundaries, so round two starts from
/// the last reply of round one. Returns the final reply, or `None` when
/// there was nothing to run.
pub async fn loop_pipeline(
    agents: &[Arc<dyn Agent>],
    input: MessageInput,
    rounds: usize,
) -> Result<Option<Message>> {
    let mut last = None;
    let mut next = input;
    for round in 1..=rounds {
        debug!(round, total = rounds, "pipeline round");
        for agent in agents {
            let reply = agent.reply(next).await?;
            next = reply.clone().into();
            last = Some(reply);
        }
    }
    Ok(last)
}

/// A broadcast group: anything sent through the hub is observed by every
/// participant, so each agent's context sees the same conversation.
pub struct MessageHub {
    participants: Vec<Arc<dyn Agent>>,
}

impl MessageHub {
    pub fn new(participants: Vec<Arc<dyn Agent>>) -> Self {
        Self { participants }
    }

    /// Broadcast an opening announcement, builder-style.
    pub async fn with_announcement(self, announcement: impl Into<MessageInput>) -> Result<Self> {
        self.broadcast(announcement.into()).await?;
        Ok(self)
    }

    /// Deliver `input` to every participant's `observe`.
    pub async fn broadcast(&self, input: MessageInput) -> Result<()> {
        for participant in &self.participants {
            participant.observe(input.clone()).await?;
        }
        Ok(())
    }

    /// Add a participant. A no-op when one with the same name is already
    /// present.
    pub fn add(&mut self, agent: Arc<dyn Agent>) {
        if self.participants.iter().any(|p| p.name() == agent.name()) {
            return;
        }
        self.participants.push(agent);
    }

    /// Remove a participant by name. Returns whether one was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.participants.len();
        self.participants.retain(|p| p.name() != name);
        self.participants.len() != before
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}
