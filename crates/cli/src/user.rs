//! A stdin-backed agent, so a human can sit wherever an [`Agent`] fits.

use async_trait::async_trait;
use pincer_core::{Agent, Error, Message, MessageInput, Result};
use std::io::{BufRead, Write};

/// Presents incoming messages on stdout and replies with lines from stdin.
///
/// End of input is reported as an `exit` message so callers can wind the
/// session down without a dedicated error variant.
pub struct UserAgent {
    name: String,
}

impl UserAgent {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn render(input: &MessageInput) {
        for message in input.clone().into_vec() {
            if let Some(text) = message.text_content() {
                println!();
                for line in text.lines() {
                    println!("  {} > {line}", message.sender);
                }
            }
        }
    }
}

#[async_trait]
impl Agent for UserAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn reply(&self, input: MessageInput) -> Result<Message> {
        Self::render(&input);

        let line = tokio::task::spawn_blocking(|| {
            print!("\n  you > ");
            let _ = std::io::stdout().flush();

            let mut line = String::new();
            match std::io::stdin().lock().read_line(&mut line) {
                Ok(0) | Err(_) => None,
                Ok(_) => Some(line.trim_end().to_string()),
            }
        })
        .await
        .map_err(|e| Error::Internal(format!("stdin reader failed: {e}")))?;

        Ok(Message::user(
            self.name.clone(),
            line.unwrap_or_else(|| "exit".into()),
        ))
    }

    async fn observe(&self, input: MessageInput) -> Result<()> {
        Self::render(&input);
        Ok(())
    }
}
