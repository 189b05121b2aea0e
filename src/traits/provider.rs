//! LowLevelFileSystem trait: the provider capability consumed by the core
//!
//! A provider owns the real storage. The core never implements disk I/O; it
//! only drives a provider through this trait and keeps buffer bookkeeping.
//!
//! Providers speak descriptors and byte slices. The `-1` sentinels of a
//! C-style API are expressed as `None` here, so the magic value never leaks
//! into the core.

use std::fmt;
use std::ops::Range;

/// Completion for an asynchronous read
///
/// Receives the number of bytes read (`None` on failure) and the backing
/// store that was handed to the provider.
pub type ReadCompletion = Box<dyn FnOnce(Option<usize>, Vec<u8>) + Send + 'static>;

/// Completion for an asynchronous write
///
/// Receives the backing store that was handed to the provider.
pub type WriteCompletion = Box<dyn FnOnce(Vec<u8>) + Send + 'static>;

/// Opaque identity of an open file at the provider level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Descriptor(i32);

impl Descriptor {
    /// Raw value that marks a closed or never-opened descriptor
    pub const INVALID: Self = Self(-1);

    /// Wrap a raw descriptor value
    #[must_use]
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// The raw descriptor value
    #[must_use]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Whether this names a descriptor that can be open
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != Self::INVALID.0
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Low-level file system capability
///
/// # Buffer contract
///
/// Synchronous calls borrow exactly the bytes they may touch. Asynchronous
/// calls take ownership of the whole backing store together with the range
/// they may touch, and must hand the store back through the completion.
/// Nothing is copied on either path; the caller gets the same allocation
/// back.
///
/// # Completion contract
///
/// Every asynchronous call invokes its completion exactly once, on whatever
/// thread the provider chooses, and never before the scheduling call has
/// returned. [`File`](crate::File) holds back a completion that arrives on
/// another thread until the provider call returns; completing inline on the
/// calling thread breaks ordering and is logged.
///
/// # Write failures
///
/// Write methods return nothing. Failures on the write path are not
/// reported to the core.
pub trait LowLevelFileSystem: Send + Sync + 'static {
    /// Open the file at `path`, `None` if it can't be opened
    fn open_file(&self, path: &str) -> Option<Descriptor>;

    /// Release a descriptor
    fn close_file(&self, fd: Descriptor);

    /// Read into `buf`, returning the number of bytes read
    ///
    /// Returns `None` if the read failed. A successful read never reports
    /// more than `buf.len()` bytes.
    fn sync_read_file(&self, fd: Descriptor, buf: &mut [u8]) -> Option<usize>;

    /// Write all of `buf`
    fn sync_write_file(&self, fd: Descriptor, buf: &[u8]);

    /// Read into `bytes[range]` and report through `on_complete`
    fn async_read_file(
        &self,
        fd: Descriptor,
        bytes: Vec<u8>,
        range: Range<usize>,
        on_complete: ReadCompletion,
    );

    /// Write `bytes[range]` and report through `on_complete`
    fn async_write_file(
        &self,
        fd: Descriptor,
        bytes: Vec<u8>,
        range: Range<usize>,
        on_complete: WriteCompletion,
    );

    /// Whether anything exists at `path`
    fn exists(&self, path: &str) -> bool;

    /// Whether `path` is a directory
    fn is_directory(&self, path: &str) -> bool;

    /// Whether `path` is a regular file
    fn is_regular_file(&self, path: &str) -> bool;
}
