//! Thin wrapper around `memmap2` for read-only and read-write column mappings.
//!
//! The planner never writes through these mappings itself (that is the downstream
//! copy stage's job); it only needs read access to locate row offsets by timestamp.

use std::fs::{File, OpenOptions};
use std::path::Path;

use memmap2::{Mmap, MmapOptions};

use crate::core::{Error, Result};

/// A read-only memory mapping of an on-disk column file.
///
/// Kept alive for as long as the planner (and, transitively, the column task it
/// hands off) needs to read from it.
pub struct MmapFile {
    mmap: Mmap,
}

impl MmapFile {
    /// Opens `path` for reading and maps it in full.
    ///
    /// Fails with [`Error::OpenFailure`] if the file cannot be opened, or
    /// [`Error::MapFailure`] if `mmap` itself fails.
    pub fn open_ro(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|err| Error::OpenFailure {
            path: path.to_path_buf(),
            errno: err.raw_os_error().unwrap_or(-1),
        })?;
        Self::from_file_ro(path, &file)
    }

    /// Maps an already-open file descriptor for reading.
    ///
    /// Used when the timestamp file descriptor is reused from the live writer
    /// (the tail partition case) rather than freshly opened by the planner.
    pub fn from_file_ro(path: &Path, file: &File) -> Result<Self> {
        let mmap = unsafe { MmapOptions::new().map(file) }.map_err(|err| Error::MapFailure {
            path: path.to_path_buf(),
            errno: err.raw_os_error().unwrap_or(-1),
        })?;
        Ok(Self { mmap })
    }

    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.mmap
    }

    /// Reinterprets the mapping as a slice of `i64` timestamps.
    ///
    /// # Panics
    ///
    /// Panics if the mapping length is not a multiple of 8 bytes. Column files are
    /// always written in fixed-width records, so a mismatch indicates corruption
    /// the caller should have already guarded against via `srcDataMax`.
    pub fn as_i64_slice(&self) -> &[i64] {
        let bytes = self.as_slice();
        debug_assert_eq!(bytes.len() % std::mem::size_of::<i64>(), 0);
        let ptr = bytes.as_ptr() as *const i64;
        unsafe { std::slice::from_raw_parts(ptr, bytes.len() / std::mem::size_of::<i64>()) }
    }
}

/// Opens `path` read-write, creating it if absent, truncated/extended to
/// exactly `rounded to page granularity by the OS`. Returns the raw file so the
/// caller can decide fd ownership (owned vs. reused) before any mapping happens.
pub fn open_rw(path: &Path) -> Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .open(path)
        .map_err(|err| Error::OpenFailure {
            path: path.to_path_buf(),
            errno: err.raw_os_error().unwrap_or(-1),
        })
}
