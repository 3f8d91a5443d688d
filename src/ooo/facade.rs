//! Standard-library-backed [`FilesFacade`], used outside of tests.

use std::fs;
use std::path::Path;

use crate::core::mmap::{open_rw, MmapFile};
use crate::core::{Error, Result};
use crate::ooo::types::FilesFacade;

/// Row width of the timestamp column, in bytes. Used to recover a partition's
/// committed row count from its on-disk file size when no separate size
/// marker is available.
const TIMESTAMP_WIDTH: u64 = 8;

pub struct StdFilesFacade;

impl FilesFacade for StdFilesFacade {
    fn open_rw(&self, path: &Path) -> Result<fs::File> {
        open_rw(path)
    }

    fn mmap_ro(&self, path: &Path, file: &fs::File) -> Result<MmapFile> {
        MmapFile::from_file_ro(path, file)
    }

    fn mkdirs(&self, path: &Path, mode: u32) -> Result<()> {
        fs::create_dir_all(path)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
        }
        Ok(())
    }

    fn read_partition_size(&self, partition_dir: &Path) -> Result<i64> {
        let timestamp_path = partition_dir.join("timestamp.d");
        let metadata = fs::metadata(&timestamp_path).map_err(|err| Error::OpenFailure {
            path: timestamp_path.clone(),
            errno: err.raw_os_error().unwrap_or(-1),
        })?;
        Ok((metadata.len() / TIMESTAMP_WIDTH) as i64)
    }
}
