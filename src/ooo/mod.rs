//! Out-of-order partition splice planner.
//!
//! Components are layered leaf-first: [`bsearch`] and [`classify`] have no
//! dependency on the rest; [`opener`] calls into both; [`merge_index`] and
//! [`publisher`] consume the opener's output; [`planner`] wires one
//! partition's full pipeline together; [`worker`] runs that pipeline across
//! a thread pool fed by the partition queue.

pub mod bsearch;
pub mod classify;
pub mod facade;
pub mod merge_index;
pub mod opener;
pub mod planner;
pub mod publisher;
pub mod types;
pub mod worker;

pub use facade::StdFilesFacade;
pub use opener::{open_partition, OpenedPartition};
pub use planner::plan_partition;
pub use publisher::{publish_columns, OpenColumnQueue};
pub use types::{
    ActiveColumn, Block, BlockKind, BlockPlan, ColumnRole, CountdownLatch, FilesFacade, MergeBlock, MergeIndex,
    MergeIndexEntry, OOOColumn, OooSlice, OpenColumnMode, OpenColumnTask, PartitionTask,
};
pub use worker::{PartitionQueue, WorkerPool};
