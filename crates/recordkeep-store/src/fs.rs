//! FileSystem trait: the only outbound dependency of a store.
//!
//! Stores read and write whole documents. [`OsFileSystem`] writes through a
//! temporary file in the destination directory and renames it over the
//! target, so a crash mid-write leaves the previous file intact.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tracing::warn;

/// Whole-file read and atomic replace.
pub trait FileSystem: Send + Sync {
    /// Read the entire file. Returns `Ok(None)` if it does not exist.
    fn read(&self, path: &Path) -> io::Result<Option<Vec<u8>>>;

    /// Replace the file's contents so readers see either the old or the new
    /// bytes, never a mix.
    fn write_atomic(&self, path: &Path, contents: &[u8]) -> io::Result<()>;
}

impl<F: FileSystem + ?Sized> FileSystem for &F {
    fn read(&self, path: &Path) -> io::Result<Option<Vec<u8>>> {
        (**self).read(path)
    }

    fn write_atomic(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        (**self).write_atomic(path, contents)
    }
}

/// The real file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn read(&self, path: &Path) -> io::Result<Option<Vec<u8>>> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write_atomic(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        // The temp file must live on the same file system for rename to be atomic.
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = tempfile::Builder::new()
            .prefix(".recordkeep-")
            .suffix(".tmp")
            .tempfile_in(dir)?;
        tmp.write_all(contents)?;
        // Temp files start out 0600; keep the mode of the file being replaced.
        if let Ok(meta) = fs::metadata(path) {
            tmp.as_file().set_permissions(meta.permissions())?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;

        // The new contents are committed once the rename succeeds.
        if let Err(e) = sync_dir(dir) {
            warn!(dir = %dir.display(), error = %e, "directory sync failed after save");
        }

        Ok(())
    }
}

/// Flush a directory entry so a completed rename survives a crash.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
