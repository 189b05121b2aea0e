//! High-level file system facade
//!
//! [`HighLevelFileSystem`] is the entry point: it opens [`File`] handles and
//! resolves [`Path`]s against a shared provider, turning provider failures
//! into [`FsError`] values.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::buffer::Buffer;
use crate::config::IoConfig;
use crate::error::{FsError, Result};
use crate::file::File;
use crate::path::Path;
use crate::stats::{IoStats, IoStatsSnapshot};
use crate::traits::LowLevelFileSystem;

/// Facade over a low-level provider
///
/// Holds the provider behind an `Arc` and hands a clone to every file it
/// opens. Nothing here owns the provider exclusively.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use hlfs::{HighLevelFileSystem, MemoryProvider, PathKind};
///
/// # fn main() -> hlfs::Result<()> {
/// let provider = MemoryProvider::new();
/// provider.insert_dir("/etc/");
///
/// let fs = HighLevelFileSystem::new(Arc::new(provider));
/// assert!(fs.exists("/etc/"));
/// assert_eq!(fs.resolve_path("/etc/")?.kind(), Some(PathKind::Directory));
/// assert!(fs.resolve_path("/missing").is_err());
/// # Ok(())
/// # }
/// ```
pub struct HighLevelFileSystem<P: LowLevelFileSystem + ?Sized> {
    /// Shared provider
    fs: Arc<P>,

    /// Buffer and block sizing
    config: IoConfig,

    /// Counters shared with every opened file
    stats: Arc<IoStats>,
}

impl<P: LowLevelFileSystem + ?Sized> HighLevelFileSystem<P> {
    /// Create a facade with the default configuration
    #[must_use]
    pub fn new(fs: Arc<P>) -> Self {
        Self {
            fs,
            config: IoConfig::default(),
            stats: Arc::new(IoStats::new()),
        }
    }

    /// Create a facade with an explicit configuration
    ///
    /// # Errors
    ///
    /// Returns `FsError::ZeroBlockSize` if the configuration is invalid.
    pub fn with_config(fs: Arc<P>, config: IoConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            fs,
            config,
            stats: Arc::new(IoStats::new()),
        })
    }

    /// Open the file at `path`
    ///
    /// # Errors
    ///
    /// Returns `FsError::CannotOpenFile` if the provider can't open it or
    /// answers with [`Descriptor::INVALID`](crate::traits::Descriptor::INVALID).
    pub fn open_file(&self, path: &str) -> Result<File<P>> {
        let Some(fd) = self.fs.open_file(path).filter(|fd| fd.is_valid()) else {
            warn!("Provider refused to open {}", path);
            return Err(FsError::CannotOpenFile(path.to_string()));
        };
        self.stats.increment_files_opened();
        debug!("Opened {} as fd {}", path, fd);
        Ok(File::with_context(
            fd,
            Arc::clone(&self.fs),
            Arc::clone(&self.stats),
            self.config.block_size,
        ))
    }

    /// Whether anything exists at `path`
    #[must_use]
    pub fn exists(&self, path: &str) -> bool {
        self.fs.exists(path)
    }

    /// Resolve and classify `path`
    ///
    /// # Errors
    ///
    /// Returns `FsError::InvalidPath` if the provider reports that the path
    /// doesn't exist.
    pub fn resolve_path(&self, path: &str) -> Result<Path> {
        if !self.fs.exists(path) {
            return Err(FsError::InvalidPath(path.to_string()));
        }
        Ok(Path::classify(path, self.fs.as_ref()))
    }

    /// Allocate a buffer of the configured capacity
    #[must_use]
    pub fn allocate_buffer(&self) -> Buffer {
        Buffer::new(self.config.buffer_capacity)
    }

    /// The active configuration
    #[must_use]
    pub const fn config(&self) -> &IoConfig {
        &self.config
    }

    /// The shared provider
    #[must_use]
    pub const fn provider(&self) -> &Arc<P> {
        &self.fs
    }

    /// Counters for everything opened through this facade
    #[must_use]
    pub fn stats(&self) -> IoStatsSnapshot {
        self.stats.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MemoryProvider;
    use crate::traits::Descriptor;

    fn facade() -> (MemoryProvider, HighLevelFileSystem<MemoryProvider>) {
        let provider = MemoryProvider::new();
        let fs = HighLevelFileSystem::new(Arc::new(provider.clone()));
        (provider, fs)
    }

    #[test]
    fn test_open_missing_file_fails() {
        let (_, fs) = facade();
        assert_eq!(
            fs.open_file("otroArchivo.txt").err(),
            Some(FsError::CannotOpenFile("otroArchivo.txt".to_string()))
        );
        assert_eq!(fs.stats().files_opened, 0);
    }

    #[test]
    fn test_open_wraps_provider_descriptor() -> anyhow::Result<()> {
        let (provider, fs) = facade();
        provider.insert_file("a.txt", Vec::new());
        provider.insert_file("b.txt", Vec::new());

        let a = fs.open_file("a.txt")?;
        let b = fs.open_file("b.txt")?;

        assert_eq!(a.descriptor(), Some(Descriptor::new(3)));
        assert_eq!(b.descriptor(), Some(Descriptor::new(4)));
        assert_eq!(fs.stats().files_opened, 2);
        Ok(())
    }

    #[test]
    fn test_files_share_facade_stats() -> anyhow::Result<()> {
        let (provider, fs) = facade();
        provider.insert_file("a.txt", vec![1, 2, 3]);

        let mut file = fs.open_file("a.txt")?;
        let mut buffer = Buffer::new(8);
        file.sync_read(&mut buffer)?;
        file.sync_write(&buffer)?;
        file.close()?;

        let stats = fs.stats();
        assert_eq!(stats.bytes_read, 3);
        assert_eq!(stats.bytes_written, 3);
        assert_eq!(stats.files_closed, 1);
        Ok(())
    }

    #[test]
    fn test_resolve_path() -> anyhow::Result<()> {
        let (provider, fs) = facade();
        provider.insert_dir("/bin/nk2.0/make/");

        let path = fs.resolve_path("/bin/nk2.0/make/")?;
        assert_eq!(path.as_str(), "/bin/nk2.0/make/");
        assert!(path.is_directory());

        assert_eq!(
            fs.resolve_path("/nope"),
            Err(FsError::InvalidPath("/nope".to_string()))
        );
        Ok(())
    }

    #[test]
    fn test_config_drives_buffers_and_blocks() -> anyhow::Result<()> {
        let provider = MemoryProvider::new();
        provider.insert_file("a.txt", Vec::new());
        let config = IoConfig {
            buffer_capacity: 32,
            block_size: 8,
        };
        let fs = HighLevelFileSystem::with_config(Arc::new(provider), config)?;

        assert_eq!(fs.allocate_buffer().capacity(), 32);
        assert_eq!(fs.open_file("a.txt")?.block_size(), 8);
        Ok(())
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = IoConfig {
            buffer_capacity: 32,
            block_size: 0,
        };
        let result = HighLevelFileSystem::with_config(Arc::new(MemoryProvider::new()), config);
        assert_eq!(result.err(), Some(FsError::ZeroBlockSize));
    }
}
