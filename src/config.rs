//! I/O configuration
//!
//! `IoConfig` is a clap argument group. Binaries embedding this crate can
//! flatten it into their own `Parser` with `#[command(flatten)]`; library
//! users build it with [`IoConfig::default`].

use crate::error::{FsError, Result};

/// Default capacity for buffers allocated by the facade
pub const DEFAULT_BUFFER_CAPACITY: usize = 4096;

/// Default block size for block-sliced writes
pub const DEFAULT_BLOCK_SIZE: usize = 512;

/// Buffer and block sizing
///
/// Used by: `HighLevelFileSystem::allocate_buffer()`,
/// `File::sync_write_in_default_blocks()`
#[derive(clap::Args, Debug, Clone, PartialEq, Eq)]
#[command(next_help_heading = "Buffer Options")]
pub struct IoConfig {
    /// Capacity in bytes of buffers allocated by the file system
    #[arg(long, default_value_t = DEFAULT_BUFFER_CAPACITY)]
    pub buffer_capacity: usize,

    /// Block size in bytes for block-sliced writes
    #[arg(long, default_value_t = DEFAULT_BLOCK_SIZE)]
    pub block_size: usize,
}

impl IoConfig {
    /// Check the configuration before use
    ///
    /// # Errors
    ///
    /// Returns `FsError::ZeroBlockSize` if `block_size` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            return Err(FsError::ZeroBlockSize);
        }
        Ok(())
    }
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestArgs {
        #[command(flatten)]
        io: IoConfig,
    }

    #[test]
    fn test_defaults_match_clap_defaults() {
        let args = TestArgs::try_parse_from(["test"]).unwrap();
        assert_eq!(args.io, IoConfig::default());
    }

    #[test]
    fn test_flags_override_defaults() {
        let args =
            TestArgs::try_parse_from(["test", "--buffer-capacity", "64", "--block-size", "8"])
                .unwrap();
        assert_eq!(args.io.buffer_capacity, 64);
        assert_eq!(args.io.block_size, 8);
        assert!(args.io.validate().is_ok());
    }

    #[test]
    fn test_zero_block_size_is_invalid() {
        let config = IoConfig {
            block_size: 0,
            ..IoConfig::default()
        };
        assert_eq!(config.validate(), Err(FsError::ZeroBlockSize));
    }
}
