//! In-memory context store — the default for tests and single-process runs.

use async_trait::async_trait;
use pincer_core::context::ContextStore;
use pincer_core::error::MemoryError;
use pincer_core::message::{Message, MessageInput};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// An ordered, id-deduplicating message store backed by a Vec.
///
/// Appends are atomic under the write lock; entries whose `id` is already
/// present are silently dropped unless duplicates were explicitly allowed at
/// construction.
pub struct InMemoryStore {
    messages: Arc<RwLock<Vec<Message>>>,
    allow_duplicates: bool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            messages: Arc::new(RwLock::new(Vec::new())),
            allow_duplicates: false,
        }
    }

    /// A store that keeps every append, even when the `id` repeats.
    pub fn with_duplicates_allowed() -> Self {
        Self {
            messages: Arc::new(RwLock::new(Vec::new())),
            allow_duplicates: true,
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContextStore for InMemoryStore {
    async fn add(&self, input: MessageInput) -> Result<(), MemoryError> {
        let incoming = input.into_vec();
        if incoming.is_empty() {
            return Ok(());
        }

        let mut messages = self.messages.write().await;
        for msg in incoming {
            if !self.allow_duplicates && messages.iter().any(|m| m.id == msg.id) {
                debug!(id = %msg.id, "dropping duplicate message");
                continue;
            }
            messages.push(msg);
        }
        Ok(())
    }

    async fn all(&self) -> Result<Vec<Message>, MemoryError> {
        Ok(self.messages.read().await.clone())
    }

    async fn clear(&self) -> Result<(), MemoryError> {
        self.messages.write().await.clear();
        Ok(())
    }

    async fn len(&self) -> Result<usize, MemoryError> {
        Ok(self.messages.read().await.len())
    }
}
