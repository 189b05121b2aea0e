//! Statistics tracking for file handle operations
//!
//! This module provides lock-free atomic statistics tracking using `IoStats`.
//! The facade owns one instance and shares it with every file it opens, so
//! counters can be bumped from provider completion threads without a mutex.

use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics tracking with interior mutability via atomics
///
/// Wrap in `Arc<IoStats>` when shared. All operations use
/// `Ordering::Relaxed`; counters only need eventual consistency.
#[derive(Debug, Default)]
pub struct IoStats {
    /// Files successfully opened
    files_opened: AtomicU64,
    /// Files closed
    files_closed: AtomicU64,
    /// Bytes reported read by the provider
    bytes_read: AtomicU64,
    /// Bytes handed to the provider for writing
    bytes_written: AtomicU64,
    /// Block writes issued by block-sliced writes
    blocks_written: AtomicU64,
    /// Reads the provider reported as failed
    read_failures: AtomicU64,
}

/// Point-in-time copy of [`IoStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IoStatsSnapshot {
    /// Files successfully opened
    pub files_opened: u64,
    /// Files closed
    pub files_closed: u64,
    /// Bytes reported read by the provider
    pub bytes_read: u64,
    /// Bytes handed to the provider for writing
    pub bytes_written: u64,
    /// Block writes issued by block-sliced writes
    pub blocks_written: u64,
    /// Reads the provider reported as failed
    pub read_failures: u64,
}

impl IoStats {
    /// Create zeroed counters
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the number of files opened
    pub fn increment_files_opened(&self) {
        self.files_opened.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the number of files closed
    pub fn increment_files_closed(&self) {
        self.files_closed.fetch_add(1, Ordering::Relaxed);
    }

    /// Add to the bytes read counter
    pub fn add_bytes_read(&self, bytes: usize) {
        self.bytes_read.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Add to the bytes written counter
    pub fn add_bytes_written(&self, bytes: usize) {
        self.bytes_written.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Increment the number of block writes
    pub fn increment_blocks_written(&self) {
        self.blocks_written.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the read failure counter
    pub fn increment_read_failures(&self) {
        self.read_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Read all counters
    #[must_use]
    pub fn snapshot(&self) -> IoStatsSnapshot {
        IoStatsSnapshot {
            files_opened: self.files_opened.load(Ordering::Relaxed),
            files_closed: self.files_closed.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            blocks_written: self.blocks_written.load(Ordering::Relaxed),
            read_failures: self.read_failures.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_counters_start_at_zero() {
        assert_eq!(IoStats::new().snapshot(), IoStatsSnapshot::default());
    }

    #[test]
    fn test_concurrent_updates() {
        let stats = Arc::new(IoStats::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let stats = Arc::clone(&stats);
                thread::spawn(move || {
                    for _ in 0..100 {
                        stats.add_bytes_read(3);
                        stats.increment_blocks_written();
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().expect("Thread panicked");
        }

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.bytes_read, 2400);
        assert_eq!(snapshot.blocks_written, 800);
        assert_eq!(snapshot.files_opened, 0);
    }
}
