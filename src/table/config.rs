//! Planner configuration.
//!
//! Mirrors the handful of knobs the splice planner actually consumes: directory
//! permissions for newly created partitions, and the capacities of the three
//! queues described in the concurrency model.

use serde::{Deserialize, Serialize};

/// Configuration consumed by the splice planner.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpliceConfig {
    /// POSIX permission bits used when creating new partition or merge-staging
    /// directories (`mkdirs(path, mode)`).
    /// Default: 0o750
    pub mkdir_mode: u32,

    /// Capacity of the open-column queue (must be a power of two). A capacity of
    /// 0 forces every column task onto the inline fallback path; useful for
    /// deterministic tests of the fallback (see property 7, "inline fallback
    /// equivalence").
    /// Default: 1024
    pub open_column_queue_capacity: usize,

    /// Capacity of the partition queue feeding the partition-job loop.
    /// Default: 1024
    pub partition_queue_capacity: usize,

    /// Number of worker threads running the partition-job loop.
    /// Default: number of available parallelism units, at least 1.
    pub worker_threads: usize,

    /// Pin each worker thread to a distinct physical core, when the platform
    /// exposes core topology. Best-effort: failure to pin never fails the pool.
    /// Default: false
    pub pin_worker_threads: bool,
}

impl Default for SpliceConfig {
    fn default() -> Self {
        let worker_threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self {
            mkdir_mode: 0o750,
            open_column_queue_capacity: 1024,
            partition_queue_capacity: 1024,
            worker_threads,
            pin_worker_threads: false,
        }
    }
}
