//! Column-task publisher (C5).
//!
//! Builds one [`OpenColumnTask`] per table column and hands it to the
//! open-column queue, falling back to running the column's open operation
//! inline on the calling thread when the queue is saturated.

use std::sync::Arc;

use crossbeam_queue::ArrayQueue;

use crate::ooo::opener::OpenedPartition;
use crate::ooo::types::{ActiveColumn, CountdownLatch, MergeIndex, OOOColumn, OpenColumnMode, OpenColumnTask};
use crate::table::{is_var_width, ColumnFd, TableWriter};

/// Bounded MPMC queue of column-open tasks. A capacity of zero degenerates
/// to an always-full queue, forcing every task onto the inline fallback path
/// (used to test that the fallback is byte-identical to the queued path).
pub struct OpenColumnQueue {
    inner: Option<ArrayQueue<OpenColumnTask>>,
}

impl OpenColumnQueue {
    pub fn new(capacity: usize) -> Self {
        Self { inner: (capacity > 0).then(|| ArrayQueue::new(capacity)) }
    }

    /// Attempts to publish `task`. `Ok(())` means a slot was obtained and
    /// the task now belongs to a queue consumer; `Err(task)` means the
    /// caller must run the inline fallback with the returned task.
    ///
    /// The legacy 3-state cursor protocol (`>=0` published, `-1` full, `-2`
    /// transient contention) collapses onto `ArrayQueue::push`'s `Result`:
    /// contention is resolved internally by its lock-free CAS loop rather
    /// than surfaced to the caller as a distinct retry state.
    pub fn try_publish(&self, task: OpenColumnTask) -> Result<(), OpenColumnTask> {
        match &self.inner {
            Some(queue) => queue.push(task),
            None => Err(task),
        }
    }

    pub fn pop(&self) -> Option<OpenColumnTask> {
        self.inner.as_ref().and_then(|q| q.pop())
    }
}

/// Publishes one column task per table column for an already-classified
/// partition. `on_inline` executes a task synchronously whenever the queue
/// is saturated; it must apply the exact same column-counter and
/// `doneLatch` semantics as a queued consumer would.
pub fn publish_columns(
    opened: &OpenedPartition,
    columns: &[ActiveColumn],
    ooo_columns: &[OOOColumn],
    table_writer: &dyn TableWriter,
    merge_index: Option<Arc<MergeIndex>>,
    done_latch: Arc<CountdownLatch>,
    queue: &OpenColumnQueue,
    mut on_inline: impl FnMut(OpenColumnTask),
) {
    let column_count = table_writer.column_count();
    let timestamp_index = table_writer.timestamp_index();
    let column_counter = Arc::new(CountdownLatch::new(column_count as u32));

    for i in 0..column_count {
        let type_code = table_writer.column_type(i);
        let role = if i == timestamp_index {
            crate::ooo::types::ColumnRole::Timestamp(type_code)
        } else {
            crate::ooo::types::ColumnRole::Regular(type_code)
        };

        let active = &columns[i];
        let ooo = &ooo_columns[i];

        let (active_fix_fd, active_var_fd, ooo_fix, ooo_var) = if is_var_width(type_code) {
            (active.fix, active.var.unwrap_or(ColumnFd::None), ooo.fix.clone(), Some(ooo.var.clone().unwrap_or_else(crate::ooo::types::OooSlice::empty)))
        } else {
            (active.fix, ColumnFd::None, ooo.fix.clone(), None)
        };

        let task = OpenColumnTask {
            open_column_mode: opened.mode,
            column_index: i,
            column_name: table_writer.column_name(i).to_string(),
            column_role: role,
            is_indexed: table_writer.is_column_indexed(i),
            ooo_fix,
            ooo_var,
            block_plan: opened.plan,
            merge_index: if matches!(opened.mode, OpenColumnMode::MidPartitionForMerge | OpenColumnMode::LastPartitionForMerge) {
                merge_index.clone()
            } else {
                None
            },
            src_timestamp_fd: opened.src_timestamp_fd,
            active_fix_fd,
            active_var_fd,
            active_top: table_writer.column_top(i),
            column_counter: column_counter.clone(),
            done_latch: done_latch.clone(),
        };

        if let Err(task) = queue.try_publish(task) {
            on_inline(task);
        }
    }
}
