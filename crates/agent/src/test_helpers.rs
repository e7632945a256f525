//! Scripted reasoners shared by the engine tests.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use pincer_core::{
    ContentBlock, Message, Reasoner, ReasonerError, ReasonerReply, ReasonerRequest, Usage,
};

/// Replays a fixed script of replies in order.
///
/// Panics when asked for more replies than were scripted. Every request is
/// recorded so tests can inspect exactly what the engine sent.
pub(crate) struct SequentialMockReasoner {
    replies: Mutex<Vec<ReasonerReply>>,
    requests: Mutex<Vec<ReasonerRequest>>,
    calls: Mutex<usize>,
}

impl SequentialMockReasoner {
    pub(crate) fn new(replies: Vec<ReasonerReply>) -> Self {
        Self {
            replies: Mutex::new(replies),
            requests: Mutex::new(Vec::new()),
            calls: Mutex::new(0),
        }
    }

    /// A script with one plain text reply.
    pub(crate) fn single_text(text: &str) -> Self {
        Self::new(vec![text_reply(text)])
    }

    /// A script that requests one tool call, then answers with text.
    pub(crate) fn tool_then_answer(tool: &str, arguments: Value, answer: &str) -> Self {
        Self::new(vec![tool_reply(tool, arguments), text_reply(answer)])
    }

    /// How many times the engine has called the reasoner.
    pub(crate) fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    /// The `idx`-th request the engine sent.
    pub(crate) fn request(&self, idx: usize) -> ReasonerRequest {
        self.requests.lock().unwrap()[idx].clone()
    }
}

#[async_trait]
impl Reasoner for SequentialMockReasoner {
    fn name(&self) -> &str {
        "mock"
    }

    async fn reply(&self, request: ReasonerRequest) -> Result<ReasonerReply, ReasonerError> {
        self.requests.lock().unwrap().push(request);
        let mut calls = self.calls.lock().unwrap();
        let idx = *calls;
        *calls += 1;

        let replies = self.replies.lock().unwrap();
        if idx >= replies.len() {
            panic!(
                "SequentialMockReasoner: no more replies (call #{}, scripted {})",
                idx + 1,
                replies.len()
            );
        }
        Ok(replies[idx].clone())
    }
}

fn usage() -> Option<Usage> {
    Some(Usage {
        prompt_tokens: 10,
        completion_tokens: 5,
        total_tokens: 15,
    })
}

/// A plain text reply carrying token usage.
pub(crate) fn text_reply(text: &str) -> ReasonerReply {
    ReasonerReply {
        message: Message::assistant("mock", text),
        usage: usage(),
        model: "mock-1".to_string(),
    }
}

/// A reply requesting one tool call with id `call_<name>`.
pub(crate) fn tool_reply(name: &str, arguments: Value) -> ReasonerReply {
    tools_reply(vec![(name, arguments)])
}

/// A reply requesting several tool calls in the given order.
pub(crate) fn tools_reply(calls: Vec<(&str, Value)>) -> ReasonerReply {
    let blocks: Vec<ContentBlock> = calls
        .into_iter()
        .map(|(name, arguments)| ContentBlock::ToolUse {
            id: format!("call_{name}"),
            name: name.to_string(),
            input: arguments,
        })
        .collect();
    ReasonerReply {
        message: Message::assistant("mock", blocks),
        usage: usage(),
        model: "mock-1".to_string(),
    }
}
