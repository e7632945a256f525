//! ContextStore trait — ordered conversational history.
//!
//! The context store is what gives an agent continuity across loop
//! iterations: every input, reasoner reply, and tool result is appended
//! here and fed back to the reasoner on the next turn.

use async_trait::async_trait;

use crate::error::MemoryError;
use crate::message::{Message, MessageInput};

/// An append-only, ordered message history.
///
/// Implementations: in-memory (the default, in `pincer-memory`).
#[async_trait]
pub trait ContextStore: Send + Sync {
    /// Append input to the history.
    ///
    /// [`MessageInput::None`] is a no-op. Items whose `id` duplicates an
    /// existing entry are silently dropped unless the store was built with
    /// duplicates explicitly allowed.
    async fn add(&self, input: MessageInput) -> std::result::Result<(), MemoryError>;

    /// All messages in insertion order.
    async fn all(&self) -> std::result::Result<Vec<Message>, MemoryError>;

    /// Remove everything.
    async fn clear(&self) -> std::result::Result<(), MemoryError>;

    /// Number of stored messages.
    async fn len(&self) -> std::result::Result<usize, MemoryError>;

    async fn is_empty(&self) -> std::result::Result<bool, MemoryError> {
        Ok(self.len().await? == 0)
    }
}
