//! Context store implementations for Pincer.

pub mod in_memory;

pub use in_memory::InMemoryStore;
