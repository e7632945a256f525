//! Human-in-the-loop tool.
//!
//! Lets the agent hand a question back to the operator mid-turn and wait for
//! the answer. The read happens on the blocking pool so the runtime stays
//! responsive, and a cancelled read is reported with `is_interrupted` set so
//! the reasoning loop stops instead of pressing on without the answer.

use async_trait::async_trait;
use pincer_core::error::ToolError;
use pincer_core::tool::{Tool, ToolResponse};
use std::io::{self, BufRead, Write};
use std::sync::Arc;

/// What came back from the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    /// A line of input, without the trailing newline.
    Line(String),
    /// The input stream ended before a line arrived.
    Closed,
    /// The operator cancelled the read.
    Interrupted,
}

/// Where `ask_human` reads replies from. Injectable so hosts and tests can
/// supply something other than process stdin.
pub trait InputSource: Send + Sync {
    /// Present `question` and block until a line, end of input, or a
    /// cancellation.
    fn read_reply(&self, question: &str) -> InputOutcome;
}

/// Reads replies from process stdin.
pub struct StdinSource;

impl InputSource for StdinSource {
    fn read_reply(&self, question: &str) -> InputOutcome {
        println!();
        println!("The agent asks:");
        println!("  {question}");
        print!("> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => InputOutcome::Closed,
            Ok(_) => InputOutcome::Line(line.trim_end().to_string()),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => InputOutcome::Interrupted,
            Err(_) => InputOutcome::Closed,
        }
    }
}

/// Asks the human operator a question and relays the answer.
pub struct AskHumanTool {
    source: Arc<dyn InputSource>,
}

impl AskHumanTool {
    pub fn new(source: Arc<dyn InputSource>) -> Self {
        Self { source }
    }

    /// An `ask_human` bound to process stdin.
    pub fn stdin() -> Self {
        Self::new(Arc::new(StdinSource))
    }
}

#[async_trait]
impl Tool for AskHumanTool {
    fn name(&self) -> &str {
        "ask_human"
    }

    fn description(&self) -> &str {
        "Ask the human operator a question and wait for their reply. Use this when you need confirmation, clarification, or information only they have."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "question": {
                    "type": "string",
                    "description": "The question to put to the human"
                }
            },
            "required": ["question"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResponse, ToolError> {
        let question = arguments["question"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("missing 'question' argument".into()))?
            .to_string();

        let source = self.source.clone();
        let outcome = tokio::task::spawn_blocking(move || source.read_reply(&question))
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "ask_human".into(),
                reason: e.to_string(),
            })?;

        Ok(match outcome {
            InputOutcome::Line(answer) => ToolResponse::text(format!("Human reply: {answer}")),
            InputOutcome::Closed => ToolResponse::text("(no input provided)"),
            InputOutcome::Interrupted => ToolResponse::interrupted("(input cancelled)"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Replays a fixed outcome and records the questions asked.
    struct ScriptedSource {
        outcome: InputOutcome,
        questions: Mutex<Vec<String>>,
    }

    impl ScriptedSource {
        fn new(outcome: InputOutcome) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                questions: Mutex::new(Vec::new()),
            })
        }
    }

    impl InputSource for ScriptedSource {
        fn read_reply(&self, question: &str) -> InputOutcome {
            self.questions.lock().unwrap().push(question.to_string());
            self.outcome.clone()
        }
    }

    #[tokio::test]
    async fn relays_the_human_reply() {
        let source = ScriptedSource::new(InputOutcome::Line("blue".into()));
        let tool = AskHumanTool::new(source.clone());

        let response = tool
            .execute(serde_json::json!({"question": "favorite color?"}))
            .await
            .unwrap();

        assert_eq!(response.text_content().as_deref(), Some("Human reply: blue"));
        assert!(!response.is_interrupted);
        assert_eq!(
            *source.questions.lock().unwrap(),
            vec!["favorite color?".to_string()]
        );
    }

    #[tokio::test]
    async fn closed_input_is_reported_as_text() {
        let source = ScriptedSource::new(InputOutcome::Closed);
        let tool = AskHumanTool::new(source);

        let response = tool
            .execute(serde_json::json!({"question": "anyone there?"}))
            .await
            .unwrap();

        assert_eq!(response.text_content().as_deref(), Some("(no input provided)"));
        assert!(!response.is_interrupted);
    }

    #[tokio::test]
    async fn cancelled_read_marks_the_interruption() {
        let source = ScriptedSource::new(InputOutcome::Interrupted);
        let tool = AskHumanTool::new(source);

        let response = tool
            .execute(serde_json::json!({"question": "proceed?"}))
            .await
            .unwrap();

        assert!(response.is_interrupted);
        assert_eq!(response.text_content().as_deref(), Some("(input cancelled)"));
    }

    #[tokio::test]
    async fn missing_question_is_rejected() {
        let tool = AskHumanTool::new(ScriptedSource::new(InputOutcome::Closed));
        let result = tool.execute(serde_json::json!({})).await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }
}
