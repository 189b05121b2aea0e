//! # hlfs
//!
//! A thin high-level layer over an injected low-level file system:
//! - [`Buffer`]: fixed-capacity byte store with a narrowing `[0, size)` window
//! - [`File`]: descriptor handle with sync, async and block-sliced I/O
//! - [`Path`]: path string classified once as directory or regular file
//! - [`HighLevelFileSystem`]: facade that opens files and resolves paths
//!
//! The storage itself is a [`LowLevelFileSystem`] provider supplied by the
//! caller. [`MemoryProvider`] is bundled for tests and small embedded trees.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use hlfs::{HighLevelFileSystem, MemoryProvider};
//!
//! # fn main() -> hlfs::Result<()> {
//! let provider = MemoryProvider::new();
//! provider.insert_file("in.bin", (0u8..10).collect::<Vec<u8>>());
//! provider.insert_file("out.bin", Vec::new());
//!
//! let fs = HighLevelFileSystem::new(Arc::new(provider.clone()));
//! let input = fs.open_file("in.bin")?;
//! let output = fs.open_file("out.bin")?;
//!
//! let mut buffer = fs.allocate_buffer();
//! input.sync_read(&mut buffer)?;
//! output.sync_write(&buffer)?;
//!
//! assert_eq!(provider.contents("out.bin"), Some((0u8..10).collect::<Vec<u8>>()));
//! # Ok(())
//! # }
//! ```

pub mod backends;
pub mod buffer;
pub mod config;
pub mod error;
pub mod file;
pub mod filesystem;
pub mod path;
pub mod stats;
pub mod traits;

pub use backends::{CompletionMode, MemoryProvider};
pub use buffer::Buffer;
pub use config::IoConfig;
pub use error::{FsError, Result};
pub use file::File;
pub use filesystem::HighLevelFileSystem;
pub use path::{Path, PathKind};
pub use stats::IoStatsSnapshot;
pub use traits::{Descriptor, LowLevelFileSystem};
