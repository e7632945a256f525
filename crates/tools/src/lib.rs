//! Built-in tool implementations for Pincer.
//!
//! Tools give the agent the ability to act instead of just talk: evaluate
//! arithmetic, report the local time, search a knowledge base, and hand a
//! question back to the human operator.

pub mod ask_human;
pub mod calculator;
pub mod current_time;
pub mod knowledge;

pub use ask_human::{AskHumanTool, InputOutcome, InputSource, StdinSource};
pub use calculator::CalculatorTool;
pub use current_time::CurrentTimeTool;
pub use knowledge::{Document, KnowledgeBase, KnowledgeSearchTool};

use pincer_core::Toolkit;
use std::sync::Arc;

/// A toolkit preloaded with the non-interactive built-ins.
///
/// `ask_human` is not included because it blocks on operator input; hosts
/// with an interactive session register it explicitly. Likewise
/// [`KnowledgeSearchTool`] needs a [`KnowledgeBase`] to search.
pub async fn builtin_toolkit() -> Toolkit {
    let toolkit = Toolkit::new();
    toolkit.register(Arc::new(CalculatorTool)).await;
    toolkit.register(Arc::new(CurrentTimeTool)).await;
    toolkit
}
