//! Bounded byte buffer with a narrowing window
//!
//! A [`Buffer`] owns a zero-filled backing store of fixed capacity and tracks
//! how many of its leading bytes are in use. The in-use region, the *window*,
//! always starts at index 0 and spans `current_size` bytes.
//!
//! Reads narrow the window to the number of bytes the provider actually
//! produced. The window is never grown past capacity by this crate, but
//! [`Buffer::limit`] does not check its argument; the `verify_*` methods are
//! the assertion points that catch an inconsistent window.

use std::ops::Range;

use crate::error::{FsError, Result};

/// Fixed-capacity byte region with a `[0, current_size)` window
///
/// The backing store is exposed directly through [`Buffer::bytes`] and
/// [`Buffer::bytes_mut`] so callers and providers can work on the bytes in
/// place. No method of this type copies the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    /// Backing store, its length is the capacity
    bytes: Vec<u8>,

    /// Number of in-use bytes at the front of the store
    size: usize,
}

impl Buffer {
    /// Create a buffer with a zero-filled store and a full window
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hlfs::Buffer;
    ///
    /// let buffer = Buffer::new(10);
    /// assert_eq!(buffer.capacity(), 10);
    /// assert_eq!(buffer.current_size(), 10);
    /// assert_eq!(buffer.end(), 9);
    /// ```
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            bytes: vec![0u8; capacity],
            size: capacity,
        }
    }

    /// Create a buffer from a signed capacity
    ///
    /// # Errors
    ///
    /// Returns `FsError::InvalidSize` if `capacity` is negative.
    pub fn try_new(capacity: i64) -> Result<Self> {
        let capacity = usize::try_from(capacity).map_err(|_| FsError::InvalidSize(capacity))?;
        Ok(Self::new(capacity))
    }

    /// Check that `read_size` bytes fit in the current window
    ///
    /// A window that was pushed past the capacity by [`Buffer::limit`] is
    /// rejected as well, since no read of that size can land in the store.
    ///
    /// # Errors
    ///
    /// Returns `FsError::OversizedRead` if `read_size` exceeds the window or
    /// the capacity.
    pub fn verify_read_size(&self, read_size: usize) -> Result<()> {
        if read_size > self.size {
            return Err(FsError::OversizedRead {
                requested: read_size,
                available: self.size,
            });
        }
        if read_size > self.capacity() {
            return Err(FsError::OversizedRead {
                requested: read_size,
                available: self.capacity(),
            });
        }
        Ok(())
    }

    /// Check the window against itself
    ///
    /// Passes for every buffer this crate produces. It exists to catch a
    /// window broken by an external [`Buffer::limit`] call.
    ///
    /// # Errors
    ///
    /// Returns `FsError::OversizedRead` if the window exceeds the capacity.
    pub fn verify_buffer_size(&self) -> Result<()> {
        self.verify_read_size(self.current_size())
    }

    /// Set the window size to `read`
    ///
    /// No bounds check happens here; follow up with
    /// [`Buffer::verify_read_size`].
    pub fn limit(&mut self, read: usize) {
        self.size = read;
    }

    /// The whole backing store
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The whole backing store, mutable
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Bytes in the current window
    ///
    /// # Errors
    ///
    /// Returns `FsError::OversizedRead` if the window exceeds the capacity.
    pub fn window(&self) -> Result<&[u8]> {
        let range = self.window_range()?;
        Ok(&self.bytes[range])
    }

    /// Number of in-use bytes
    #[must_use]
    pub const fn current_size(&self) -> usize {
        self.size
    }

    /// Capacity of the backing store
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// First index of the window, always 0
    #[must_use]
    pub const fn start(&self) -> usize {
        0
    }

    /// Last index of the window, `-1` for an empty window
    #[must_use]
    #[allow(clippy::cast_possible_wrap)] // Vec lengths never exceed isize::MAX
    pub const fn end(&self) -> isize {
        self.size as isize - 1
    }

    /// Validated range of the current window
    pub(crate) fn window_range(&self) -> Result<Range<usize>> {
        self.verify_buffer_size()?;
        Ok(self.start()..self.size)
    }

    /// Validated range of an arbitrary span of the backing store
    pub(crate) fn span(&self, offset: usize, len: usize) -> Result<Range<usize>> {
        let out_of_range = || FsError::BlockOutOfRange {
            offset,
            len,
            capacity: self.capacity(),
        };
        let end = offset.checked_add(len).ok_or_else(out_of_range)?;
        if end > self.capacity() {
            return Err(out_of_range());
        }
        Ok(offset..end)
    }

    /// Split into backing store and window size for an owned hand-off
    pub(crate) fn into_parts(self) -> (Vec<u8>, usize) {
        (self.bytes, self.size)
    }

    /// Reassemble a buffer handed back by a provider
    pub(crate) const fn from_parts(bytes: Vec<u8>, size: usize) -> Self {
        Self { bytes, size }
    }
}

impl From<Vec<u8>> for Buffer {
    /// Wrap existing bytes; the window covers all of them
    fn from(bytes: Vec<u8>) -> Self {
        let size = bytes.len();
        Self { bytes, size }
    }
}
