//! The reasoning loop and its execution shell.
//!
//! [`ReactAgent`] drives the Reason + Act cycle:
//!
//! 1. Append the incoming message to the context store
//! 2. Send the system prompt, the full context, and the tool catalog to the
//!    reasoner
//! 3. **Tool requests present**: dispatch each through the toolkit in order,
//!    append the outcomes, go back to step 2
//! 4. **No tool requests**: the reply is the turn's answer
//!
//! The cycle is bounded; when the iteration budget runs out, one final call
//! with tool use disabled forces a summary instead of looping forever.
//!
//! [`InterruptibleAgent`] wraps an agent so an in-flight turn can be
//! cancelled cooperatively from outside, and [`pipeline`] holds the small
//! combinators for chaining agents and broadcasting between them.

pub mod interrupt;
pub mod pipeline;
pub mod react;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use interrupt::InterruptibleAgent;
pub use pipeline::{MessageHub, loop_pipeline, sequential_pipeline};
pub use react::ReactAgent;
