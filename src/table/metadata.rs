//! Table schema, as consumed by the splice planner.
//!
//! The planner treats the table's schema and column-file handles as an opaque
//! collaborator (§6): it asks `TableWriter` for column names/types/fds and never
//! mutates them. `TableSchema` additionally shows how that metadata is persisted,
//! the same way `TableMetadata` persists a partition scheme in the message-queue
//! table module this planner was adapted from.

use std::fs;
use std::os::unix::io::RawFd;
use std::path::Path;

use crate::core::{Error, Result};

/// Opaque column type code. Negative of a regular code marks the timestamp
/// column at the serialized-task boundary (§3 invariants); everywhere else in
/// this crate the marker is carried as `ColumnRole` instead, see
/// `crate::ooo::types`.
pub type ColumnTypeCode = i32;

pub const COLUMN_TYPE_STRING: ColumnTypeCode = 1;
pub const COLUMN_TYPE_BINARY: ColumnTypeCode = 2;
pub const COLUMN_TYPE_TIMESTAMP: ColumnTypeCode = 3;
pub const COLUMN_TYPE_LONG: ColumnTypeCode = 4;
pub const COLUMN_TYPE_INT: ColumnTypeCode = 5;
pub const COLUMN_TYPE_DOUBLE: ColumnTypeCode = 6;

/// Whether a column type stores variable-length data in a second file.
pub fn is_var_width(type_code: ColumnTypeCode) -> bool {
    matches!(type_code, COLUMN_TYPE_STRING | COLUMN_TYPE_BINARY)
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub type_code: ColumnTypeCode,
    pub indexed: bool,
}

/// On-disk table schema, saved once at table creation and read back by every
/// planner invocation via a `TableWriter` implementation.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TableSchema {
    pub version: u32,
    pub timestamp_index: usize,
    pub columns: Vec<ColumnDef>,
}

const SCHEMA_VERSION: u32 = 1;
const SCHEMA_FILENAME: &str = "schema.json";

impl TableSchema {
    pub fn new(timestamp_index: usize, columns: Vec<ColumnDef>) -> Self {
        Self {
            version: SCHEMA_VERSION,
            timestamp_index,
            columns,
        }
    }

    pub fn save(&self, table_root: &Path) -> Result<()> {
        let dir = table_root.join("_table");
        fs::create_dir_all(&dir)?;
        let json = serde_json::to_string_pretty(self)
            .map_err(|_| Error::Corrupt("failed to serialize table schema"))?;
        fs::write(dir.join(SCHEMA_FILENAME), json)?;
        Ok(())
    }

    pub fn load(table_root: &Path) -> Result<Self> {
        let path = table_root.join("_table").join(SCHEMA_FILENAME);
        let json = fs::read_to_string(&path)?;
        let schema: TableSchema =
            serde_json::from_str(&json).map_err(|_| Error::Corrupt("invalid table schema JSON"))?;
        if schema.version != SCHEMA_VERSION {
            return Err(Error::Unsupported("unsupported table schema version"));
        }
        Ok(schema)
    }
}

/// A file descriptor already open for a column's current writable slot, tagged
/// with whether the planner owns it (must close) or is reusing the writer's own
/// handle (must not close). Mirrors the negative/positive fd sentinel in the
/// legacy wire format (§9) without leaking it into the API.
#[derive(Debug, Clone, Copy)]
pub enum ColumnFd {
    /// Fd owned by the planner; the downstream column worker closes it.
    Owned(RawFd),
    /// Fd borrowed from the live `TableWriter`; must not be closed downstream.
    Reused(RawFd),
    /// Column has no currently open file (e.g. a brand-new partition).
    None,
}

/// Per-column pair of currently open writer-side file descriptors: the fixed
/// slot, and (for string/binary columns) the variable slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActiveColumnFds {
    pub fix: Option<RawFd>,
    pub var: Option<RawFd>,
}

/// Metadata and live-writer state the planner reads but never mutates.
///
/// Out of scope per §1 (schema/metadata management); this trait is the seam the
/// planner calls through, named from the original system's `TableWriter`.
pub trait TableWriter: Send + Sync {
    fn column_count(&self) -> usize;
    fn timestamp_index(&self) -> usize;
    fn column_name(&self, i: usize) -> &str;
    fn column_type(&self, i: usize) -> ColumnTypeCode;
    fn is_column_indexed(&self, i: usize) -> bool;
    /// Leading rows of the active partition for which this column has no
    /// stored value, because the column was added after the partition was
    /// created. The downstream copy stage backfills these with null.
    fn column_top(&self, i: usize) -> i64;
    /// Currently open fds for column `i`'s writable slot(s), if any.
    fn active_column_fd(&self, i: usize) -> ActiveColumnFds;
}

/// A `TableWriter` over a fixed, in-memory schema with no live column fds.
///
/// Used by the opener whenever a partition is freshly created (`NEW_PARTITION`)
/// or by tests that don't need to exercise the "reuse an open fd" path.
pub struct StaticTableWriter {
    schema: TableSchema,
    column_tops: Vec<i64>,
}

impl StaticTableWriter {
    pub fn new(schema: TableSchema) -> Self {
        let column_tops = vec![0; schema.columns.len()];
        Self { schema, column_tops }
    }

    pub fn with_column_tops(schema: TableSchema, column_tops: Vec<i64>) -> Self {
        assert_eq!(column_tops.len(), schema.columns.len());
        Self { schema, column_tops }
    }
}

impl TableWriter for StaticTableWriter {
    fn column_count(&self) -> usize {
        self.schema.columns.len()
    }

    fn timestamp_index(&self) -> usize {
        self.schema.timestamp_index
    }

    fn column_name(&self, i: usize) -> &str {
        &self.schema.columns[i].name
    }

    fn column_type(&self, i: usize) -> ColumnTypeCode {
        self.schema.columns[i].type_code
    }

    fn is_column_indexed(&self, i: usize) -> bool {
        self.schema.columns[i].indexed
    }

    fn column_top(&self, i: usize) -> i64 {
        self.column_tops[i]
    }

    fn active_column_fd(&self, _i: usize) -> ActiveColumnFds {
        ActiveColumnFds::default()
    }
}
