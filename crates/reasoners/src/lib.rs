//! Language-model backends.
//!
//! A [`Reasoner`](pincer_core::Reasoner) turns the conversation so far into
//! one reply. The shipped backend speaks the OpenAI chat-completions dialect,
//! which covers OpenAI itself plus the long tail of compatible endpoints.

pub mod openai;

pub use openai::OpenAiReasoner;
