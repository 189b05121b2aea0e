//! File handle over a provider descriptor
//!
//! A [`File`] binds a [`Descriptor`] to a shared provider and moves bytes
//! between the provider and a [`Buffer`]. It owns the buffer bookkeeping:
//! after a read, the buffer window is narrowed to the number of bytes the
//! provider produced and then re-verified.
//!
//! Write paths do not report provider failures; the provider interface has
//! no failure signal for writes.

use std::future::Future;
use std::iter;
use std::ops::Range;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use futures::channel::oneshot;
use futures::executor::block_on;
use tracing::{debug, warn};

use crate::buffer::Buffer;
use crate::config::DEFAULT_BLOCK_SIZE;
use crate::error::{FsError, Result};
use crate::stats::IoStats;
use crate::traits::{Descriptor, LowLevelFileSystem};

/// Handle to an open file
///
/// The descriptor is released exactly once by [`File::close`]. Every other
/// operation on a closed handle fails with `FsError::Closed`.
///
/// `close` takes `&mut self`; the remaining operations take `&self` and
/// may be issued while asynchronous operations are outstanding. The handle
/// imposes no ordering between outstanding operations.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use hlfs::{Buffer, HighLevelFileSystem, MemoryProvider};
///
/// # fn main() -> hlfs::Result<()> {
/// let provider = MemoryProvider::new();
/// provider.insert_file("data.bin", vec![3, 3, 3, 3]);
///
/// let fs = HighLevelFileSystem::new(Arc::new(provider));
/// let mut file = fs.open_file("data.bin")?;
///
/// let mut buffer = Buffer::new(10);
/// let read = file.sync_read(&mut buffer)?;
/// assert_eq!(read, 4);
/// assert_eq!(buffer.bytes(), &[3, 3, 3, 3, 0, 0, 0, 0, 0, 0]);
///
/// file.close()?;
/// # Ok(())
/// # }
/// ```
pub struct File<P: LowLevelFileSystem + ?Sized> {
    /// Live descriptor, `None` once closed
    fd: Option<Descriptor>,

    /// Shared provider
    fs: Arc<P>,

    /// Counters shared with the facade that opened this file
    stats: Arc<IoStats>,

    /// Block size for [`File::sync_write_in_default_blocks`]
    block_size: usize,
}

impl<P: LowLevelFileSystem + ?Sized> File<P> {
    /// Wrap a descriptor already opened on `fs`
    ///
    /// [`Descriptor::INVALID`] yields a handle that is already closed.
    #[must_use]
    pub fn new(fd: Descriptor, fs: Arc<P>) -> Self {
        Self::with_context(fd, fs, Arc::new(IoStats::new()), DEFAULT_BLOCK_SIZE)
    }

    pub(crate) fn with_context(
        fd: Descriptor,
        fs: Arc<P>,
        stats: Arc<IoStats>,
        block_size: usize,
    ) -> Self {
        Self {
            fd: fd.is_valid().then_some(fd),
            fs,
            stats,
            block_size,
        }
    }

    /// The live descriptor, `None` once closed
    #[must_use]
    pub const fn descriptor(&self) -> Option<Descriptor> {
        self.fd
    }

    /// Whether the descriptor has been released
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.fd.is_none()
    }

    /// Block size used by [`File::sync_write_in_default_blocks`]
    #[must_use]
    pub const fn block_size(&self) -> usize {
        self.block_size
    }

    /// Release the descriptor
    ///
    /// # Errors
    ///
    /// Returns `FsError::AlreadyClosed` if the descriptor was already
    /// released. A second close always fails.
    pub fn close(&mut self) -> Result<()> {
        let fd = self.fd.take().ok_or(FsError::AlreadyClosed)?;
        self.fs.close_file(fd);
        self.stats.increment_files_closed();
        debug!("Closed file descriptor {}", fd);
        Ok(())
    }

    /// Read into the buffer's current window
    ///
    /// On success the window is narrowed to the bytes read.
    ///
    /// # Returns
    ///
    /// Returns the number of bytes read (0 at end of file).
    ///
    /// # Errors
    ///
    /// Returns `FsError` if:
    /// - The handle is closed (`Closed`)
    /// - The provider reports a failure (`ReadFailed`)
    /// - The window or the reported count is inconsistent (`OversizedRead`)
    pub fn sync_read(&self, buffer: &mut Buffer) -> Result<usize> {
        let fd = self.live_fd()?;
        let range = buffer.window_range()?;
        let outcome = self.fs.sync_read_file(fd, &mut buffer.bytes_mut()[range]);
        self.finish_read(fd, buffer, outcome)
    }

    /// Read into `[offset, offset + size)` of the buffer's backing store
    ///
    /// Used to read a file in segments into disjoint regions of one buffer.
    /// On success the window is narrowed to the bytes read, exactly as with
    /// [`File::sync_read`].
    ///
    /// # Errors
    ///
    /// Same as [`File::sync_read`], plus `FsError::BlockOutOfRange` if the
    /// span doesn't fit in the backing store.
    pub fn sync_read_with_range(
        &self,
        buffer: &mut Buffer,
        offset: usize,
        size: usize,
    ) -> Result<usize> {
        let fd = self.live_fd()?;
        let range = buffer.span(offset, size)?;
        let outcome = self.fs.sync_read_file(fd, &mut buffer.bytes_mut()[range]);
        self.finish_read(fd, buffer, outcome)
    }

    /// Write the buffer's current window
    ///
    /// # Errors
    ///
    /// Returns `FsError::Closed` on a closed handle, or
    /// `FsError::OversizedRead` if the window exceeds the capacity.
    pub fn sync_write(&self, buffer: &Buffer) -> Result<()> {
        let fd = self.live_fd()?;
        let range = buffer.window_range()?;
        self.write_span(fd, buffer, range);
        Ok(())
    }

    /// Write exactly `size` bytes starting at `offset`
    ///
    /// This is the primitive used to emit one block.
    ///
    /// # Errors
    ///
    /// Returns `FsError::Closed` on a closed handle, or
    /// `FsError::BlockOutOfRange` if the span doesn't fit in the backing
    /// store.
    pub fn sync_write_block(&self, buffer: &Buffer, offset: usize, size: usize) -> Result<()> {
        let fd = self.live_fd()?;
        let range = buffer.span(offset, size)?;
        self.write_span(fd, buffer, range);
        Ok(())
    }

    /// Write the buffer's window in blocks of `block_size` bytes
    ///
    /// The write cursor starts at `block_size`, not at 0, and advances by
    /// `block_size` while it is at most the window length. Each cursor
    /// position emits one block ending at `cursor + block_size` or at the
    /// window end, whichever comes first. The first `block_size` bytes are
    /// therefore not written by this call, and a window that is an exact
    /// multiple of `block_size` ends with an empty block.
    ///
    /// Everything is validated before the first write.
    ///
    /// # Returns
    ///
    /// Returns the number of block writes issued.
    ///
    /// # Errors
    ///
    /// Returns `FsError` if:
    /// - The handle is closed (`Closed`)
    /// - `block_size` is zero (`ZeroBlockSize`)
    /// - `block_size` exceeds the window end index (`BlockSizeTooLarge`)
    pub fn sync_write_in_blocks(&self, buffer: &Buffer, block_size: usize) -> Result<usize> {
        let fd = self.live_fd()?;
        if block_size == 0 {
            return Err(FsError::ZeroBlockSize);
        }
        let window = buffer.window_range()?;
        let window_end = buffer.end();
        if isize::try_from(block_size).map_or(true, |size| size > window_end) {
            return Err(FsError::BlockSizeTooLarge {
                block_size,
                window_end,
            });
        }

        let spans: Vec<Range<usize>> = block_spans(window.end, block_size).collect();
        debug!(
            "Writing {} bytes to fd {} as {} blocks of {} bytes",
            window.end,
            fd,
            spans.len(),
            block_size
        );
        for span in &spans {
            self.write_span(fd, buffer, span.clone());
            self.stats.increment_blocks_written();
        }
        Ok(spans.len())
    }

    /// [`File::sync_write_in_blocks`] with the configured block size
    ///
    /// # Errors
    ///
    /// Same as [`File::sync_write_in_blocks`].
    pub fn sync_write_in_default_blocks(&self, buffer: &Buffer) -> Result<usize> {
        self.sync_write_in_blocks(buffer, self.block_size)
    }

    /// Schedule a read into the buffer's window
    ///
    /// The buffer moves to the provider and comes back through
    /// `on_complete`. When the provider finishes, the reported count is
    /// checked against the window and `on_complete` runs exactly once with
    /// the buffer, or with the error. The window is not narrowed on this
    /// path. A completion delivered on another thread waits until the
    /// provider call has returned.
    ///
    /// # Errors
    ///
    /// Returns `FsError::Closed` or `FsError::OversizedRead` without
    /// scheduling anything; `on_complete` is then never called and the
    /// buffer is dropped.
    pub fn async_read<F>(&self, buffer: Buffer, on_complete: F) -> Result<()>
    where
        F: FnOnce(Result<Buffer>) + Send + 'static,
    {
        let fd = self.live_fd()?;
        let range = buffer.window_range()?;
        let (bytes, size) = buffer.into_parts();
        let stats = Arc::clone(&self.stats);
        let (release, handoff) = Handoff::new();

        self.fs.async_read_file(
            fd,
            bytes,
            range,
            Box::new(move |outcome, bytes| {
                handoff.wait(fd);
                let buffer = Buffer::from_parts(bytes, size);
                let result = match outcome {
                    Some(read) => buffer.verify_read_size(read).map(|()| {
                        stats.add_bytes_read(read);
                        buffer
                    }),
                    None => {
                        stats.increment_read_failures();
                        warn!("Async read failed on fd {}", fd);
                        Err(FsError::ReadFailed(fd))
                    }
                };
                on_complete(result);
            }),
        );
        let _ = release.send(());
        Ok(())
    }

    /// Schedule a write of the buffer's window
    ///
    /// `on_complete` runs exactly once when the provider finishes and gets
    /// the buffer back, never while the provider call is still running. There is no failure surface on this path.
    ///
    /// # Errors
    ///
    /// Returns `FsError::Closed` or `FsError::OversizedRead` without
    /// scheduling anything; `on_complete` is then never called.
    pub fn async_write<F>(&self, buffer: Buffer, on_complete: F) -> Result<()>
    where
        F: FnOnce(Buffer) + Send + 'static,
    {
        let fd = self.live_fd()?;
        let range = buffer.window_range()?;
        self.stats.add_bytes_written(range.len());
        let (bytes, size) = buffer.into_parts();
        let (release, handoff) = Handoff::new();

        self.fs.async_write_file(
            fd,
            bytes,
            range,
            Box::new(move |bytes| {
                handoff.wait(fd);
                on_complete(Buffer::from_parts(bytes, size));
            }),
        );
        let _ = release.send(());
        Ok(())
    }

    /// Awaitable form of [`File::async_read`]
    ///
    /// # Errors
    ///
    /// The future resolves to the same errors as [`File::async_read`], or
    /// `FsError::CompletionDropped` if the provider never completes.
    pub fn read_async(
        &self,
        buffer: Buffer,
    ) -> impl Future<Output = Result<Buffer>> + Send + 'static {
        let (tx, rx) = oneshot::channel();
        let scheduled = self.live_fd().and_then(|fd| {
            self.async_read(buffer, move |result| {
                let _ = tx.send(result);
            })
            .map(|()| fd)
        });

        async move {
            match scheduled {
                Ok(fd) => rx
                    .await
                    .unwrap_or(Err(FsError::CompletionDropped(fd))),
                Err(err) => Err(err),
            }
        }
    }

    /// Awaitable form of [`File::async_write`]
    ///
    /// # Errors
    ///
    /// The future resolves to the same errors as [`File::async_write`], or
    /// `FsError::CompletionDropped` if the provider never completes.
    pub fn write_async(
        &self,
        buffer: Buffer,
    ) -> impl Future<Output = Result<Buffer>> + Send + 'static {
        let (tx, rx) = oneshot::channel();
        let scheduled = self.live_fd().and_then(|fd| {
            self.async_write(buffer, move |buffer| {
                let _ = tx.send(buffer);
            })
            .map(|()| fd)
        });

        async move {
            match scheduled {
                Ok(fd) => rx.await.map_err(|_| FsError::CompletionDropped(fd)),
                Err(err) => Err(err),
            }
        }
    }

    fn live_fd(&self) -> Result<Descriptor> {
        self.fd.ok_or(FsError::Closed)
    }

    fn finish_read(
        &self,
        fd: Descriptor,
        buffer: &mut Buffer,
        outcome: Option<usize>,
    ) -> Result<usize> {
        let Some(read) = outcome else {
            self.stats.increment_read_failures();
            warn!("Read failed on fd {}", fd);
            return Err(FsError::ReadFailed(fd));
        };
        buffer.limit(read);
        buffer.verify_read_size(read)?;
        self.stats.add_bytes_read(read);
        Ok(read)
    }

    fn write_span(&self, fd: Descriptor, buffer: &Buffer, range: Range<usize>) {
        self.stats.add_bytes_written(range.len());
        self.fs.sync_write_file(fd, &buffer.bytes()[range]);
    }
}

/// Block spans emitted for a window of `window_len` bytes
///
/// Cursor starts at `block_size` and stops once it passes `window_len`.
fn block_spans(window_len: usize, block_size: usize) -> impl Iterator<Item = Range<usize>> {
    iter::successors(Some(block_size), move |&offset| offset.checked_add(block_size))
        .take_while(move |&offset| offset <= window_len)
        .map(move |offset| offset..offset.saturating_add(block_size).min(window_len))
}

/// Holds a completion back until the provider call that scheduled it returns
struct Handoff {
    released: oneshot::Receiver<()>,
    scheduler: ThreadId,
}

impl Handoff {
    fn new() -> (oneshot::Sender<()>, Self) {
        let (release, released) = oneshot::channel();
        let handoff = Self {
            released,
            scheduler: thread::current().id(),
        };
        (release, handoff)
    }

    fn wait(mut self, fd: Descriptor) {
        if thread::current().id() != self.scheduler {
            let _ = block_on(self.released);
            return;
        }
        // Blocking here would deadlock a provider that completes inline
        if !matches!(self.released.try_recv(), Ok(Some(()))) {
            warn!("Provider completed fd {} inside the scheduling call", fd);
        }
    }
}
