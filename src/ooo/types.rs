//! Core data model: tasks, block plans, and the shared primitives (countdown
//! latch, fd/column-role tags) that flow between the classifier, opener,
//! merge-index builder and publisher.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::core::wait::{futex_wait, futex_wake};
use crate::table::{ColumnFd, PartitionBy, TableWriter};

/// Where the rows of a block come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    None,
    /// Existing on-disk rows.
    Data,
    /// Rows from the OOO slice.
    Oo,
    /// Rows interleaved from both sides via a merge index.
    Merge,
}

/// How a column's write is opened for a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenColumnMode {
    NewPartitionForAppend,
    MidPartitionForAppend,
    LastPartitionForAppend,
    MidPartitionForMerge,
    LastPartitionForMerge,
}

/// An inclusive `[lo, hi]` row range sourced from one side (data or OOO).
/// `BlockKind::None` blocks carry no meaningful range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub lo: i64,
    pub hi: i64,
}

impl Block {
    pub const NONE: Block = Block { kind: BlockKind::None, lo: 0, hi: -1 };

    pub fn data(lo: i64, hi: i64) -> Self {
        Block { kind: BlockKind::Data, lo, hi }
    }

    pub fn oo(lo: i64, hi: i64) -> Self {
        Block { kind: BlockKind::Oo, lo, hi }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.kind, BlockKind::None) || self.lo > self.hi
    }

    pub fn len(&self) -> i64 {
        if self.is_empty() { 0 } else { self.hi - self.lo + 1 }
    }
}

/// The middle block of a classified plan: either absent, or a merge of a data
/// run against an OOO run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeBlock {
    pub kind: BlockKind,
    pub data_lo: i64,
    pub data_hi: i64,
    pub ooo_lo: i64,
    pub ooo_hi: i64,
}

impl MergeBlock {
    pub const NONE: MergeBlock = MergeBlock {
        kind: BlockKind::None,
        data_lo: 0,
        data_hi: -1,
        ooo_lo: 0,
        ooo_hi: -1,
    };

    pub fn data_is_empty(&self) -> bool {
        self.data_lo > self.data_hi
    }

    pub fn ooo_is_empty(&self) -> bool {
        self.ooo_lo > self.ooo_hi
    }
}

/// The `(prefix, merge, suffix)` decomposition produced by the overlap
/// classifier for one partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockPlan {
    pub prefix: Block,
    pub merge: MergeBlock,
    pub suffix: Block,
}

/// Whether a column type code names the table's designated timestamp column.
/// Idiomatic replacement for the legacy negated-`columnType` sentinel (§9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Timestamp(i32),
    Regular(i32),
}

impl ColumnRole {
    pub fn type_code(&self) -> i32 {
        match self {
            ColumnRole::Timestamp(code) | ColumnRole::Regular(code) => *code,
        }
    }

    pub fn is_timestamp(&self) -> bool {
        matches!(self, ColumnRole::Timestamp(_))
    }
}

/// A contiguous slice of a shared OOO column buffer. Cheap to clone (an
/// `Arc` bump) so it can be handed to a worker thread through the
/// open-column queue without copying the underlying bytes.
#[derive(Debug, Clone)]
pub struct OooSlice {
    data: Arc<[u8]>,
    offset: usize,
    len: usize,
}

impl OooSlice {
    pub fn new(data: Arc<[u8]>, offset: usize, len: usize) -> Self {
        debug_assert!(offset + len <= data.len());
        Self { data, offset, len }
    }

    pub fn empty() -> Self {
        Self { data: Arc::from(Vec::new().into_boxed_slice()), offset: 0, len: 0 }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data[self.offset..self.offset + self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reinterprets the slice as packed `(timestamp: i64, rowid: i64)` pairs.
    pub fn as_ts_rowid_pairs(&self) -> &[(i64, i64)] {
        let bytes = self.as_bytes();
        debug_assert_eq!(bytes.len() % 16, 0);
        let ptr = bytes.as_ptr() as *const (i64, i64);
        unsafe { std::slice::from_raw_parts(ptr, bytes.len() / 16) }
    }

    pub fn as_i64_slice(&self) -> &[i64] {
        let bytes = self.as_bytes();
        debug_assert_eq!(bytes.len() % 8, 0);
        let ptr = bytes.as_ptr() as *const i64;
        unsafe { std::slice::from_raw_parts(ptr, bytes.len() / 8) }
    }
}

/// In-memory descriptor of one column's OOO contribution: the fixed-width
/// slice, and (for string/binary columns) the variable-width slice.
#[derive(Debug, Clone)]
pub struct OOOColumn {
    pub fix: OooSlice,
    pub var: Option<OooSlice>,
}

/// A table's currently writable file handles for one column.
#[derive(Debug, Clone, Copy)]
pub struct ActiveColumn {
    pub fix: ColumnFd,
    pub var: Option<ColumnFd>,
}

/// A merge-index entry: an ascending timestamp paired with a source-tagged
/// row id. The top bit of `tagged_row_id` distinguishes data rows from OOO
/// rows, same role as the legacy packed `packed_source_position` field (§4.4)
/// but kept as two plain fields instead of bit-packing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeIndexEntry {
    pub timestamp: i64,
    pub row_id: i64,
    pub from_data: bool,
}

/// The flat, sorted merge index produced by the merge-index builder (C4) and
/// shared by every column task of one partition.
#[derive(Debug)]
pub struct MergeIndex {
    pub entries: Vec<MergeIndexEntry>,
}

/// Decrements from an initial count to zero; workers waiting on it block on a
/// futex rather than spinning. Used both as the per-partition column counter
/// and as the process-wide `doneLatch`.
pub struct CountdownLatch {
    count: AtomicU32,
}

impl CountdownLatch {
    pub fn new(count: u32) -> Self {
        Self { count: AtomicU32::new(count) }
    }

    pub fn get(&self) -> u32 {
        self.count.load(Ordering::Acquire)
    }

    /// Decrements the counter by one, waking any waiters if it reaches zero.
    /// Returns the value after decrementing.
    pub fn count_down(&self) -> u32 {
        let prev = self.count.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(prev > 0, "countdown latch decremented past zero");
        let next = prev - 1;
        if next == 0 {
            let _ = futex_wake(&self.count);
        }
        next
    }

    /// Blocks the calling thread until the counter reaches zero.
    pub fn wait(&self) {
        loop {
            let current = self.count.load(Ordering::Acquire);
            if current == 0 {
                return;
            }
            let _ = futex_wait(&self.count, current, None);
        }
    }
}

/// Input to the planner for a single target partition. Immutable once
/// published onto the partition queue.
pub struct PartitionTask {
    pub table_root: PathBuf,
    pub partition_by: PartitionBy,
    pub columns: Vec<ActiveColumn>,
    pub ooo_columns: Vec<OOOColumn>,
    pub src_ooo_lo: i64,
    pub src_ooo_hi: i64,
    pub src_ooo_max: i64,
    pub ooo_timestamp_min: i64,
    pub ooo_timestamp_max: i64,
    pub ooo_timestamp_hi: i64,
    pub txn: u64,
    /// Packed `(timestamp, rowid)` 16-byte entries covering the entire OOO
    /// ingest batch, sorted ascending by timestamp.
    pub sorted_timestamps: OooSlice,
    pub last_partition_size: i64,
    pub table_ceil_of_max_timestamp: i64,
    pub table_floor_of_min_timestamp: i64,
    pub table_floor_of_max_timestamp: i64,
    pub table_max_timestamp: i64,
    pub table_writer: Arc<dyn TableWriter>,
    pub done_latch: Arc<CountdownLatch>,
}

impl PartitionTask {
    pub fn partition_dir_name(&self) -> String {
        self.partition_by.directory_name(self.ooo_timestamp_lo())
    }

    /// `oooTimestampLo`: timestamp at `srcOooLo` in the sorted batch,
    /// defining this partition's identity directory name.
    pub fn ooo_timestamp_lo(&self) -> i64 {
        let pairs = self.sorted_timestamps.as_ts_rowid_pairs();
        pairs[self.src_ooo_lo as usize].0
    }

    pub fn partition_dir(&self) -> PathBuf {
        self.table_root.join(self.partition_dir_name())
    }

    pub fn merge_staging_dir(&self) -> PathBuf {
        self.table_root.join(format!("{}.{}", self.partition_dir_name(), self.txn))
    }
}

/// Output of the publisher (C5): one per column per partition.
pub struct OpenColumnTask {
    pub open_column_mode: OpenColumnMode,
    pub column_index: usize,
    pub column_name: String,
    pub column_role: ColumnRole,
    pub is_indexed: bool,
    pub ooo_fix: OooSlice,
    pub ooo_var: Option<OooSlice>,
    pub block_plan: BlockPlan,
    pub merge_index: Option<Arc<MergeIndex>>,
    pub src_timestamp_fd: ColumnFd,
    pub active_fix_fd: ColumnFd,
    pub active_var_fd: ColumnFd,
    /// Leading rows with no stored value for this column (§ Column top).
    pub active_top: i64,
    /// Shared across every column task of the same partition; the last
    /// column to finish frees the merge index.
    pub column_counter: Arc<CountdownLatch>,
    pub done_latch: Arc<CountdownLatch>,
}

/// External filesystem seam (§6): the only filesystem access the planner
/// performs. A real implementation backs it with `std::fs`/`memmap2`; tests
/// substitute an in-memory double.
pub trait FilesFacade: Send + Sync {
    fn open_rw(&self, path: &Path) -> crate::core::Result<std::fs::File>;
    fn mmap_ro(&self, path: &Path, file: &std::fs::File) -> crate::core::Result<crate::core::mmap::MmapFile>;
    fn mkdirs(&self, path: &Path, mode: u32) -> crate::core::Result<()>;
    /// Reads the archived row count for an already-committed partition.
    fn read_partition_size(&self, partition_dir: &Path) -> crate::core::Result<i64>;
}
