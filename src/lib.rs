//! Out-of-order partition splice planner for a partitioned, column-per-file
//! time-series store.
//!
//! Given an already-sorted ingest batch whose timestamps are not guaranteed
//! to be greater than a partition's last persisted timestamp, this crate
//! decides how to splice the batch into the existing on-disk partition
//! (prefix/merge/suffix decomposition), builds the merge index a downstream
//! copy stage streams from, and publishes one column task per table column
//! onto a worker pool.
//!
//! Schema/metadata management, the column copy executors, transaction commit
//! and durability are external collaborators; see [`table::TableWriter`] and
//! [`ooo::FilesFacade`] for the seams this crate consumes.

pub mod core;
pub mod ooo;
pub mod table;

pub use core::{Error, Result};
pub use ooo::{
    open_partition, plan_partition, publish_columns, OpenColumnQueue, OpenedPartition, PartitionQueue, StdFilesFacade,
    WorkerPool,
};
pub use table::{PartitionBy, SpliceConfig, TableWriter};
