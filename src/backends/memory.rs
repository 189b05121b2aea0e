//! In-memory provider backend
//!
//! `MemoryProvider` implements [`LowLevelFileSystem`] over a map of paths to
//! byte vectors. It is meant for tests and for embedding small fixed trees.
//!
//! Directories are explicit entries, separate from files. Each descriptor
//! keeps its own read cursor; writes append to the file.

use std::collections::{HashMap, HashSet, VecDeque};
use std::ops::Range;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

use tracing::debug;

use crate::traits::{Descriptor, LowLevelFileSystem, ReadCompletion, WriteCompletion};

/// First descriptor handed out; 0-2 are left to the standard streams
const FIRST_DESCRIPTOR: i32 = 3;

/// Where asynchronous completions run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompletionMode {
    /// Queue completions until [`MemoryProvider::run_pending`] is called
    #[default]
    Deferred,
    /// Run each completion on a freshly spawned thread
    Threaded,
}

type Job = Box<dyn FnOnce() + Send + 'static>;

#[derive(Default)]
struct State {
    files: HashMap<String, Vec<u8>>,
    dirs: HashSet<String>,
    open: HashMap<Descriptor, OpenFile>,
    next_fd: i32,
    fail_reads: bool,
    pending: VecDeque<Job>,
}

struct OpenFile {
    path: String,
    cursor: usize,
}

impl State {
    fn read(&mut self, fd: Descriptor, buf: &mut [u8]) -> Option<usize> {
        if self.fail_reads {
            return None;
        }
        let open = self.open.get_mut(&fd)?;
        let data = self.files.get(&open.path)?;
        let remaining = data.get(open.cursor..).unwrap_or_default();
        let read = remaining.len().min(buf.len());
        buf[..read].copy_from_slice(&remaining[..read]);
        open.cursor += read;
        Some(read)
    }

    fn write(&mut self, fd: Descriptor, buf: &[u8]) {
        let Some(open) = self.open.get(&fd) else {
            debug!("Dropping write to unknown fd {}", fd);
            return;
        };
        if let Some(data) = self.files.get_mut(&open.path) {
            data.extend_from_slice(buf);
        }
    }
}

/// In-memory [`LowLevelFileSystem`]
///
/// Clones share the same state, so a test can keep one clone for inspection
/// while the facade owns another.
///
/// # Example
///
/// ```rust
/// use hlfs::{LowLevelFileSystem, MemoryProvider};
///
/// let mem = MemoryProvider::new();
/// mem.insert_file("config/settings.json", b"{}".to_vec());
/// mem.insert_dir("config");
///
/// assert!(mem.is_regular_file("config/settings.json"));
/// assert!(mem.is_directory("config"));
/// ```
#[derive(Clone)]
pub struct MemoryProvider {
    state: Arc<Mutex<State>>,
    mode: CompletionMode,
}

impl MemoryProvider {
    /// Create an empty provider with deferred completions
    #[must_use]
    pub fn new() -> Self {
        Self::with_mode(CompletionMode::Deferred)
    }

    /// Create an empty provider with the given completion mode
    #[must_use]
    pub fn with_mode(mode: CompletionMode) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                next_fd: FIRST_DESCRIPTOR,
                ..State::default()
            })),
            mode,
        }
    }

    /// Insert or overwrite a file
    pub fn insert_file(&self, path: impl Into<String>, data: Vec<u8>) {
        self.lock().files.insert(path.into(), data);
    }

    /// Insert a directory entry
    pub fn insert_dir(&self, path: impl Into<String>) {
        self.lock().dirs.insert(path.into());
    }

    /// Remove a file, returning its data if it existed
    pub fn remove(&self, path: &str) -> Option<Vec<u8>> {
        self.lock().files.remove(path)
    }

    /// Current contents of a file
    #[must_use]
    pub fn contents(&self, path: &str) -> Option<Vec<u8>> {
        self.lock().files.get(path).cloned()
    }

    /// Make every subsequent read report failure
    pub fn fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }

    /// Number of descriptors not yet closed
    #[must_use]
    pub fn open_descriptors(&self) -> usize {
        self.lock().open.len()
    }

    /// Number of queued completions
    #[must_use]
    pub fn pending(&self) -> usize {
        self.lock().pending.len()
    }

    /// Run queued completions until the queue is empty
    ///
    /// Completions that schedule more work are drained too. The lock is not
    /// held while a completion runs.
    ///
    /// # Returns
    ///
    /// Returns the number of completions run.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            let job = self.lock().pending.pop_front();
            let Some(job) = job else {
                return ran;
            };
            job();
            ran += 1;
        }
    }

    #[allow(clippy::expect_used)] // Mutex poisoning is unrecoverable
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("Provider mutex poisoned")
    }

    fn dispatch(&self, job: Job) {
        match self.mode {
            CompletionMode::Deferred => self.lock().pending.push_back(job),
            CompletionMode::Threaded => {
                thread::spawn(job);
            }
        }
    }
}

impl Default for MemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LowLevelFileSystem for MemoryProvider {
    fn open_file(&self, path: &str) -> Option<Descriptor> {
        let mut state = self.lock();
        if !state.files.contains_key(path) {
            return None;
        }
        let fd = Descriptor::new(state.next_fd);
        state.next_fd += 1;
        state.open.insert(
            fd,
            OpenFile {
                path: path.to_string(),
                cursor: 0,
            },
        );
        Some(fd)
    }

    fn close_file(&self, fd: Descriptor) {
        self.lock().open.remove(&fd);
    }

    fn sync_read_file(&self, fd: Descriptor, buf: &mut [u8]) -> Option<usize> {
        self.lock().read(fd, buf)
    }

    fn sync_write_file(&self, fd: Descriptor, buf: &[u8]) {
        self.lock().write(fd, buf);
    }

    fn async_read_file(
        &self,
        fd: Descriptor,
        mut bytes: Vec<u8>,
        range: Range<usize>,
        on_complete: ReadCompletion,
    ) {
        let state = Arc::clone(&self.state);
        self.dispatch(Box::new(move || {
            #[allow(clippy::expect_used)] // Mutex poisoning is unrecoverable
            let outcome = state
                .lock()
                .expect("Provider mutex poisoned")
                .read(fd, &mut bytes[range]);
            on_complete(outcome, bytes);
        }));
    }

    fn async_write_file(
        &self,
        fd: Descriptor,
        bytes: Vec<u8>,
        range: Range<usize>,
        on_complete: WriteCompletion,
    ) {
        let state = Arc::clone(&self.state);
        self.dispatch(Box::new(move || {
            #[allow(clippy::expect_used)] // Mutex poisoning is unrecoverable
            state
                .lock()
                .expect("Provider mutex poisoned")
                .write(fd, &bytes[range]);
            on_complete(bytes);
        }));
    }

    fn exists(&self, path: &str) -> bool {
        let state = self.lock();
        state.files.contains_key(path) || state.dirs.contains(path)
    }

    fn is_directory(&self, path: &str) -> bool {
        self.lock().dirs.contains(path)
    }

    fn is_regular_file(&self, path: &str) -> bool {
        self.lock().files.contains_key(path)
    }
}
