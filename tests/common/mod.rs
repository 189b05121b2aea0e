//! Shared test helpers: a recording provider and tracing setup

use hlfs::traits::{ReadCompletion, WriteCompletion};
use hlfs::{Descriptor, LowLevelFileSystem};
use std::collections::{HashMap, HashSet, VecDeque};
use std::ops::Range;
use std::sync::{Mutex, MutexGuard};

/// Install a fmt subscriber writing through the test harness
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Every provider call, in order
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(dead_code)]
pub enum Call {
    Open(String),
    Close(Descriptor),
    SyncRead { fd: Descriptor, len: usize },
    SyncWrite { fd: Descriptor, bytes: Vec<u8> },
    AsyncRead { fd: Descriptor, range: Range<usize> },
    AsyncWrite { fd: Descriptor, range: Range<usize> },
    Exists(String),
    IsDirectory(String),
    IsRegularFile(String),
}

type ReadScript = Box<dyn FnOnce(&mut [u8]) -> Option<usize> + Send>;

struct PendingRead {
    bytes: Vec<u8>,
    range: Range<usize>,
    on_complete: ReadCompletion,
}

struct PendingWrite {
    bytes: Vec<u8>,
    on_complete: WriteCompletion,
}

#[derive(Default)]
struct Inner {
    descriptors: HashMap<String, Descriptor>,
    existing: HashSet<String>,
    directories: HashSet<String>,
    regular_files: HashSet<String>,
    reads: VecDeque<ReadScript>,
    default_read: Option<usize>,
    calls: Vec<Call>,
    pending_reads: VecDeque<PendingRead>,
    pending_writes: VecDeque<PendingWrite>,
}

/// Hand-written provider mock
///
/// Opens answer with stubbed descriptors, sync reads answer from a script
/// queue, and async operations stay pending until a test completes them.
/// Everything is recorded in [`Call`] order.
#[derive(Default)]
pub struct RecordingProvider {
    inner: Mutex<Inner>,
}

#[allow(dead_code)]
impl RecordingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stub_open(&self, path: &str, fd: i32) {
        self.lock()
            .descriptors
            .insert(path.to_string(), Descriptor::new(fd));
    }

    pub fn stub_path(&self, path: &str, is_directory: bool, is_regular_file: bool) {
        let mut inner = self.lock();
        inner.existing.insert(path.to_string());
        if is_directory {
            inner.directories.insert(path.to_string());
        }
        if is_regular_file {
            inner.regular_files.insert(path.to_string());
        }
    }

    /// Queue the answer for the next sync read
    pub fn script_read<F>(&self, script: F)
    where
        F: FnOnce(&mut [u8]) -> Option<usize> + Send + 'static,
    {
        self.lock().reads.push_back(Box::new(script));
    }

    /// Answer for sync reads once the script queue is empty, `None` by default
    pub fn set_default_read(&self, outcome: Option<usize>) {
        self.lock().default_read = outcome;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn sync_writes(&self) -> Vec<Vec<u8>> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                Call::SyncWrite { bytes, .. } => Some(bytes.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.lock().calls.iter().filter(|call| matches(call)).count()
    }

    pub fn pending_reads(&self) -> usize {
        self.lock().pending_reads.len()
    }

    pub fn pending_writes(&self) -> usize {
        self.lock().pending_writes.len()
    }

    /// Complete the oldest pending async read
    ///
    /// `fill` sees only the range the read was scheduled for.
    pub fn complete_next_read<F>(&self, fill: F) -> bool
    where
        F: FnOnce(&mut [u8]) -> Option<usize>,
    {
        let pending = self.lock().pending_reads.pop_front();
        let Some(PendingRead {
            mut bytes,
            range,
            on_complete,
        }) = pending
        else {
            return false;
        };
        let outcome = fill(&mut bytes[range]);
        on_complete(outcome, bytes);
        true
    }

    /// Complete the oldest pending async write
    pub fn complete_next_write(&self) -> bool {
        let pending = self.lock().pending_writes.pop_front();
        let Some(PendingWrite { bytes, on_complete }) = pending else {
            return false;
        };
        on_complete(bytes);
        true
    }

    /// Drop every pending completion without running it
    pub fn drop_pending(&self) {
        let mut inner = self.lock();
        inner.pending_reads.clear();
        inner.pending_writes.clear();
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("mock mutex poisoned")
    }
}

impl LowLevelFileSystem for RecordingProvider {
    fn open_file(&self, path: &str) -> Option<Descriptor> {
        let mut inner = self.lock();
        inner.calls.push(Call::Open(path.to_string()));
        inner.descriptors.get(path).copied()
    }

    fn close_file(&self, fd: Descriptor) {
        self.lock().calls.push(Call::Close(fd));
    }

    fn sync_read_file(&self, fd: Descriptor, buf: &mut [u8]) -> Option<usize> {
        let script = {
            let mut inner = self.lock();
            inner.calls.push(Call::SyncRead { fd, len: buf.len() });
            inner.reads.pop_front()
        };
        match script {
            Some(script) => script(buf),
            None => self.lock().default_read,
        }
    }

    fn sync_write_file(&self, fd: Descriptor, buf: &[u8]) {
        self.lock().calls.push(Call::SyncWrite {
            fd,
            bytes: buf.to_vec(),
        });
    }

    fn async_read_file(
        &self,
        fd: Descriptor,
        bytes: Vec<u8>,
        range: Range<usize>,
        on_complete: ReadCompletion,
    ) {
        let mut inner = self.lock();
        inner.calls.push(Call::AsyncRead {
            fd,
            range: range.clone(),
        });
        inner.pending_reads.push_back(PendingRead {
            bytes,
            range,
            on_complete,
        });
    }

    fn async_write_file(
        &self,
        fd: Descriptor,
        bytes: Vec<u8>,
        range: Range<usize>,
        on_complete: WriteCompletion,
    ) {
        let mut inner = self.lock();
        inner.calls.push(Call::AsyncWrite { fd, range });
        inner.pending_writes.push_back(PendingWrite { bytes, on_complete });
    }

    fn exists(&self, path: &str) -> bool {
        let mut inner = self.lock();
        inner.calls.push(Call::Exists(path.to_string()));
        inner.existing.contains(path)
    }

    fn is_directory(&self, path: &str) -> bool {
        let mut inner = self.lock();
        inner.calls.push(Call::IsDirectory(path.to_string()));
        inner.directories.contains(path)
    }

    fn is_regular_file(&self, path: &str) -> bool {
        let mut inner = self.lock();
        inner.calls.push(Call::IsRegularFile(path.to_string()));
        inner.regular_files.contains(path)
    }
}
