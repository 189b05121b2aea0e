//! Provider backend implementations
//!
//! This module provides concrete implementations of the `LowLevelFileSystem`
//! trait. Real OS bindings live outside this crate.

pub mod memory;

// Re-export main types for convenience
pub use memory::{CompletionMode, MemoryProvider};
