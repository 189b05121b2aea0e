//! Core traits for the provider abstraction
//!
//! The high-level types in this crate are generic over [`LowLevelFileSystem`],
//! so any storage backend can be plugged in: the bundled
//! [`MemoryProvider`](crate::backends::MemoryProvider), a real OS binding, or
//! a hand-written mock in tests.

pub mod provider;

pub use provider::{Descriptor, LowLevelFileSystem, ReadCompletion, WriteCompletion};
