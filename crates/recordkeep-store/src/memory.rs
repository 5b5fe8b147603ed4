//! In-memory implementation of the FileSystem trait.
//!
//! This is primarily for testing. Writes are atomic trivially, and failures
//! can be injected to exercise the I/O error paths without touching disk.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use crate::fs::FileSystem;

/// In-memory file system.
///
/// All data is lost when it is dropped. Thread-safe via RwLock.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    inner: RwLock<MemoryFsInner>,
}

#[derive(Debug, Default)]
struct MemoryFsInner {
    /// File contents by path.
    files: HashMap<PathBuf, Vec<u8>>,

    /// Injected read failure.
    read_failure: Option<io::ErrorKind>,

    /// Injected write failure.
    write_failure: Option<io::ErrorKind>,

    /// Successful writes, for asserting save behavior.
    writes: usize,
}

impl MemoryFileSystem {
    /// Create an empty in-memory file system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Place raw bytes at `path`, bypassing failure injection.
    pub fn put(&self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.files.insert(path.into(), contents.into());
    }

    /// Current contents of `path`, if any.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.files.get(path.as_ref()).cloned()
    }

    /// Make every subsequent read fail with `kind`.
    pub fn fail_reads(&self, kind: io::ErrorKind) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.read_failure = Some(kind);
    }

    /// Make every subsequent write fail with `kind` (e.g. a full disk).
    pub fn fail_writes(&self, kind: io::ErrorKind) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.write_failure = Some(kind);
    }

    /// Clear injected failures.
    pub fn heal(&self) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.read_failure = None;
        inner.write_failure = None;
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.writes
    }
}

impl FileSystem for MemoryFileSystem {
    fn read(&self, path: &Path) -> io::Result<Option<Vec<u8>>> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(kind) = inner.read_failure {
            return Err(io::Error::new(kind, "injected read failure"));
        }
        Ok(inner.files.get(path).cloned())
    }

    fn write_atomic(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(kind) = inner.write_failure {
            return Err(io::Error::new(kind, "injected write failure"));
        }
        inner.files.insert(path.to_path_buf(), contents.to_vec());
        inner.writes += 1;
        Ok(())
    }
}
