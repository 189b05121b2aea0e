//! Error types for high-level file system operations
//!
//! Every failure is raised at the call site that detects it. Nothing in this
//! crate retries, and nothing swallows an error on the way up.

use crate::traits::Descriptor;
use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, FsError>;

/// Errors raised by buffers, file handles, paths and the facade
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FsError {
    /// A buffer was requested with a negative capacity
    #[error("the buffer size must be greater or equal to zero, got {0}")]
    InvalidSize(i64),

    /// A requested or reported read size exceeds the buffer window
    #[error("can't read {requested} bytes into a buffer window of {available} bytes")]
    OversizedRead {
        /// Bytes requested or reported by the provider
        requested: usize,
        /// Bytes available in the current window
        available: usize,
    },

    /// The provider could not open the file
    #[error("can't open file {0}: invalid file descriptor")]
    CannotOpenFile(String),

    /// The provider reported a read failure
    #[error("couldn't read the file with fd={0}")]
    ReadFailed(Descriptor),

    /// Close was requested on a handle without a live descriptor
    #[error("the file is closed or doesn't exist")]
    AlreadyClosed,

    /// Read or write attempted on a closed handle
    #[error("operation on a closed file handle")]
    Closed,

    /// The block size is larger than the data available in the buffer
    #[error("block size {block_size} must be equal to or smaller than the buffer end {window_end}")]
    BlockSizeTooLarge {
        /// Requested block size
        block_size: usize,
        /// Index of the last byte in the buffer window (-1 when empty)
        window_end: isize,
    },

    /// Block writes need a non-zero block size
    #[error("block size must be greater than zero")]
    ZeroBlockSize,

    /// A span does not fit in the buffer's backing store
    #[error("span at offset {offset} with length {len} exceeds buffer capacity {capacity}")]
    BlockOutOfRange {
        /// First byte of the span
        offset: usize,
        /// Length of the span
        len: usize,
        /// Capacity of the backing store
        capacity: usize,
    },

    /// Path resolution was requested for a path that doesn't exist
    #[error("the path doesn't exist: {0}")]
    InvalidPath(String),

    /// The provider dropped an async completion without invoking it
    #[error("the provider dropped the completion of fd={0} without running it")]
    CompletionDropped(Descriptor),
}
