//! Paths classified at resolution time

use std::fmt;

use tracing::debug;

use crate::traits::LowLevelFileSystem;

/// What a path pointed at when it was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathKind {
    /// A directory
    Directory,
    /// A regular file
    RegularFile,
}

/// A path string with its classification
///
/// The provider is queried once, at construction. The classification
/// reflects the file system at that moment and is never refreshed. A path
/// that is neither a directory nor a regular file stays unclassified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    path: String,
    kind: Option<PathKind>,
}

impl Path {
    /// Classify `path` against `fs`
    ///
    /// Both predicates are asked. When a provider answers yes to both, the
    /// regular file answer wins.
    pub fn classify<P>(path: impl Into<String>, fs: &P) -> Self
    where
        P: LowLevelFileSystem + ?Sized,
    {
        let path = path.into();
        let mut kind = None;
        if fs.is_directory(&path) {
            kind = Some(PathKind::Directory);
        }
        if fs.is_regular_file(&path) {
            kind = Some(PathKind::RegularFile);
        }
        debug!("Classified path {} as {:?}", path, kind);
        Self { path, kind }
    }

    /// The classification, `None` if the path was neither kind
    #[must_use]
    pub const fn kind(&self) -> Option<PathKind> {
        self.kind
    }

    /// The path string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// Whether the provider classified this path as a directory
    #[must_use]
    pub fn is_directory(&self) -> bool {
        self.kind == Some(PathKind::Directory)
    }

    /// Whether the provider classified this path as a regular file
    #[must_use]
    pub fn is_regular_file(&self) -> bool {
        self.kind == Some(PathKind::RegularFile)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl AsRef<str> for Path {
    fn as_ref(&self) -> &str {
        &self.path
    }
}
