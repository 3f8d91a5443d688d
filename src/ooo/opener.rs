//! Partition opener (C3).
//!
//! Decides whether the target partition is new, the live tail, or an
//! archived partition requiring a merge-staging directory; maps or reuses
//! the on-disk timestamp column accordingly and finalizes the
//! [`OpenColumnMode`].

use std::path::PathBuf;

use crate::core::mmap::MmapFile;
use crate::core::Result;
use crate::ooo::bsearch::{bsearch64, ScanDirection};
use crate::ooo::classify::classify;
use crate::ooo::types::{Block, BlockKind, BlockPlan, FilesFacade, MergeBlock, OpenColumnMode, PartitionTask};
use crate::table::ColumnFd;

/// Result of opening a partition: the finalized mode, the block plan (only
/// meaningful when `mode != NewPartitionForAppend`), and the source
/// timestamp handle the merge-index builder and publisher read from.
pub struct OpenedPartition {
    pub mode: OpenColumnMode,
    pub plan: BlockPlan,
    pub partition_dir: PathBuf,
    pub merge_staging_dir: Option<PathBuf>,
    pub src_timestamp_fd: ColumnFd,
    pub src_timestamp: Option<MmapFile>,
    pub src_data_max: i64,
}

/// Opens the partition named by `task` against `facade`, classifying overlap
/// when there's existing data to splice against.
pub fn open_partition(
    task: &PartitionTask,
    mkdir_mode: u32,
    facade: &dyn FilesFacade,
) -> Result<OpenedPartition> {
    let ooo_ts_hi = task.ooo_timestamp_hi;

    if ooo_ts_hi > task.table_ceil_of_max_timestamp || ooo_ts_hi < task.table_floor_of_min_timestamp {
        let partition_dir = task.partition_dir();
        facade.mkdirs(&partition_dir, mkdir_mode)?;
        return Ok(OpenedPartition {
            mode: OpenColumnMode::NewPartitionForAppend,
            plan: BlockPlan { prefix: Block::NONE, merge: MergeBlock::NONE, suffix: Block::oo(task.src_ooo_lo, task.src_ooo_hi) },
            partition_dir,
            merge_staging_dir: None,
            src_timestamp_fd: ColumnFd::None,
            src_timestamp: None,
            src_data_max: 0,
        });
    }

    let partition_dir = task.partition_dir();
    let timestamp_path = partition_dir.join("timestamp.d");

    let is_tail = ooo_ts_hi == task.table_ceil_of_max_timestamp;
    let (src_timestamp_fd, src_timestamp, src_data_max) = if is_tail {
        let active_fds = task.table_writer.active_column_fd(task.table_writer.timestamp_index());
        let file = facade.open_rw(&timestamp_path)?;
        let mapped = facade.mmap_ro(&timestamp_path, &file)?;
        let fd = match active_fds.fix {
            Some(raw_fd) => ColumnFd::Reused(raw_fd),
            None => ColumnFd::Owned(std::os::unix::io::IntoRawFd::into_raw_fd(file)),
        };
        (fd, Some(mapped), task.last_partition_size)
    } else {
        let file = facade.open_rw(&timestamp_path)?;
        let mapped = facade.mmap_ro(&timestamp_path, &file)?;
        let size = facade.read_partition_size(&partition_dir)?;
        let fd = ColumnFd::Owned(std::os::unix::io::IntoRawFd::into_raw_fd(file));
        (fd, Some(mapped), size)
    };

    let data_ts_all = src_timestamp.as_ref().unwrap().as_i64_slice();
    let data_ts = &data_ts_all[..src_data_max as usize];

    let ooo_pairs = task.sorted_timestamps.as_ts_rowid_pairs();
    let ooo_local: Vec<i64> = (task.src_ooo_lo..=task.src_ooo_hi)
        .map(|global| ooo_pairs[global as usize].0)
        .collect();

    let plan = classify(data_ts, &ooo_local, task.src_ooo_lo, task.src_ooo_hi);

    let table_floor_of_max_timestamp = task.table_floor_of_max_timestamp;
    let mode = if plan.prefix.kind == BlockKind::None && ooo_ts_hi < table_floor_of_max_timestamp {
        OpenColumnMode::MidPartitionForAppend
    } else if plan.prefix.kind == BlockKind::None {
        OpenColumnMode::LastPartitionForAppend
    } else if matches!(src_timestamp_fd, ColumnFd::Reused(_)) {
        OpenColumnMode::LastPartitionForMerge
    } else {
        OpenColumnMode::MidPartitionForMerge
    };

    let merge_staging_dir = if matches!(mode, OpenColumnMode::MidPartitionForMerge | OpenColumnMode::LastPartitionForMerge) {
        let dir = task.merge_staging_dir();
        facade.mkdirs(&dir, mkdir_mode)?;
        Some(dir)
    } else {
        None
    };

    Ok(OpenedPartition { mode, plan, partition_dir, merge_staging_dir, src_timestamp_fd, src_timestamp, src_data_max })
}

/// Exposed for the merge-index builder, which needs the same floor/ceil
/// lookups against the raw timestamp arrays that the classifier used.
pub fn floor_index(data_ts: &[i64], value: i64) -> i64 {
    bsearch64(data_ts, value, ScanDirection::Down)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooo::facade::StdFilesFacade;
    use std::fs;
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::TempDir;

    use crate::ooo::types::{ActiveColumn, CountdownLatch, OOOColumn, OooSlice};
    use crate::table::{ColumnDef, StaticTableWriter, TableSchema, COLUMN_TYPE_INT, COLUMN_TYPE_TIMESTAMP};

    fn write_i64_column(path: &Path, values: &[i64]) {
        let mut bytes = Vec::with_capacity(values.len() * 8);
        for v in values {
            bytes.extend_from_slice(&v.to_ne_bytes());
        }
        fs::write(path, bytes).unwrap();
    }

    fn make_task(table_root: &Path, ooo_ts: &[i64], ooo_hi: i64, table_ceil: i64, table_floor_min: i64, table_floor_max: i64) -> PartitionTask {
        let mut bytes = Vec::new();
        for (i, ts) in ooo_ts.iter().enumerate() {
            bytes.extend_from_slice(&ts.to_ne_bytes());
            bytes.extend_from_slice(&(i as i64).to_ne_bytes());
        }
        let sorted = OooSlice::new(Arc::from(bytes.into_boxed_slice()), 0, ooo_ts.len() * 16);

        let schema = TableSchema::new(
            0,
            vec![
                ColumnDef { name: "timestamp".into(), type_code: COLUMN_TYPE_TIMESTAMP, indexed: false },
                ColumnDef { name: "value".into(), type_code: COLUMN_TYPE_INT, indexed: false },
            ],
        );
        let writer: Arc<dyn crate::table::TableWriter> = Arc::new(StaticTableWriter::new(schema));

        PartitionTask {
            table_root: table_root.to_path_buf(),
            partition_by: crate::table::PartitionBy::Day,
            columns: vec![ActiveColumn { fix: ColumnFd::None, var: None }; 2],
            ooo_columns: vec![OOOColumn { fix: OooSlice::empty(), var: None }; 2],
            src_ooo_lo: 0,
            src_ooo_hi: ooo_hi,
            src_ooo_max: ooo_ts.len() as i64,
            ooo_timestamp_min: ooo_ts[0],
            ooo_timestamp_max: *ooo_ts.last().unwrap(),
            ooo_timestamp_hi: *ooo_ts.last().unwrap(),
            txn: 7,
            sorted_timestamps: sorted,
            last_partition_size: 0,
            table_ceil_of_max_timestamp: table_ceil,
            table_floor_of_min_timestamp: table_floor_min,
            table_floor_of_max_timestamp: table_floor_max,
            table_max_timestamp: table_ceil,
            table_writer: writer,
            done_latch: Arc::new(CountdownLatch::new(1)),
        }
    }

    #[test]
    fn test_new_partition_when_hi_exceeds_ceil() {
        let dir = TempDir::new().unwrap();
        let task = make_task(dir.path(), &[1_000_000], 0, 500_000, 0, 400_000);
        let facade = StdFilesFacade;
        let opened = open_partition(&task, 0o750, &facade).unwrap();
        assert_eq!(opened.mode, OpenColumnMode::NewPartitionForAppend);
        assert!(opened.partition_dir.is_dir());
    }

    #[test]
    fn test_mid_partition_for_append_on_archived_partition() {
        let dir = TempDir::new().unwrap();
        let partition_dir = dir.path().join("1970-01-01");
        fs::create_dir_all(&partition_dir).unwrap();
        write_i64_column(&partition_dir.join("timestamp.d"), &[10, 20, 30]);

        // OOO extends the tail of an archived (non-last) partition but stays
        // below the next partition's floor: MID_PARTITION_FOR_APPEND.
        let task = make_task(dir.path(), &[40, 50], 1, 100, 0, 60);
        let facade = StdFilesFacade;
        let opened = open_partition(&task, 0o750, &facade).unwrap();
        assert_eq!(opened.mode, OpenColumnMode::MidPartitionForAppend);
        assert!(!matches!(opened.src_timestamp_fd, ColumnFd::Reused(_)));
    }
}
