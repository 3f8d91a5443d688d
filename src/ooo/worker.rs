//! Partition-job loop and worker pool (C6).
//!
//! Each worker repeatedly dequeues a partition task, acknowledges the queue
//! slot immediately, then runs the planner. Acknowledging before planning
//! keeps the partition queue's critical section limited to the pop itself,
//! so producers are never blocked behind a worker's planning work.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

use crossbeam_queue::ArrayQueue;
use log::{error, warn};

use crate::ooo::planner::plan_partition;
use crate::ooo::publisher::OpenColumnQueue;
use crate::ooo::types::{FilesFacade, OpenColumnTask, PartitionTask};
use crate::table::SpliceConfig;

/// The bounded queue the partition-job loop consumes from. Unlike
/// [`OpenColumnQueue`], producers here block (park) when the queue is full
/// rather than degrading to an inline path — there is no equivalent
/// "planner inline" fallback for whole partitions.
pub struct PartitionQueue {
    queue: ArrayQueue<Arc<PartitionTask>>,
    doorbell: Mutex<()>,
    condvar: Condvar,
    closed: AtomicBool,
}

impl PartitionQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: ArrayQueue::new(capacity.max(1)),
            doorbell: Mutex::new(()),
            condvar: Condvar::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Publishes a task, parking the caller while the queue is full.
    pub fn publish(&self, mut task: Arc<PartitionTask>) {
        loop {
            match self.queue.push(task) {
                Ok(()) => {
                    self.condvar.notify_one();
                    return;
                }
                Err(rejected) => {
                    task = rejected;
                    let guard = self.doorbell.lock().unwrap();
                    let _ = self.condvar.wait_timeout(guard, std::time::Duration::from_millis(1));
                }
            }
        }
    }

    /// Signals every worker loop to exit once the queue drains.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.condvar.notify_all();
    }

    /// Blocks until a task is available or the queue is closed and empty,
    /// in which case it returns `None`.
    fn pop_blocking(&self) -> Option<Arc<PartitionTask>> {
        loop {
            if let Some(task) = self.queue.pop() {
                return Some(task);
            }
            if self.closed.load(Ordering::Acquire) {
                return None;
            }
            let guard = self.doorbell.lock().unwrap();
            let _ = self.condvar.wait_timeout(guard, std::time::Duration::from_millis(5));
        }
    }
}

/// A fixed pool of worker threads running the partition-job loop.
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `config.worker_threads` workers draining `partition_queue`,
    /// planning each task against `facade` and publishing column work onto
    /// `column_queue`. `on_inline` runs a column task synchronously whenever
    /// `column_queue` is saturated.
    pub fn spawn(
        config: &SpliceConfig,
        partition_queue: Arc<PartitionQueue>,
        column_queue: Arc<OpenColumnQueue>,
        facade: Arc<dyn FilesFacade>,
        on_inline: impl Fn(OpenColumnTask) + Send + Sync + 'static,
    ) -> Self {
        let on_inline = Arc::new(on_inline);
        let core_ids = config.pin_worker_threads.then(core_affinity::get_core_ids).flatten();

        let handles = (0..config.worker_threads.max(1))
            .map(|worker_index| {
                let partition_queue = partition_queue.clone();
                let column_queue = column_queue.clone();
                let facade = facade.clone();
                let on_inline = on_inline.clone();
                let mkdir_mode = config.mkdir_mode;
                let core_id = core_ids.as_ref().and_then(|ids| ids.get(worker_index % ids.len().max(1)).copied());

                std::thread::Builder::new()
                    .name(format!("splice-worker-{worker_index}"))
                    .spawn(move || {
                        if let Some(core_id) = core_id {
                            if !core_affinity::set_for_current(core_id) {
                                warn!("failed to pin worker {worker_index} to core {core_id:?}");
                            }
                        }
                        run_partition_job_loop(&partition_queue, &column_queue, mkdir_mode, facade.as_ref(), on_inline.as_ref());
                    })
                    .expect("failed to spawn splice worker thread")
            })
            .collect();

        Self { handles }
    }

    pub fn join(self) {
        for handle in self.handles {
            let _ = handle.join();
        }
    }
}

/// The partition-job loop body (§4.6): pop, acknowledge, plan, repeat.
/// Returns once `partition_queue` is closed and drained.
fn run_partition_job_loop(
    partition_queue: &PartitionQueue,
    column_queue: &OpenColumnQueue,
    mkdir_mode: u32,
    facade: &dyn FilesFacade,
    on_inline: &(dyn Fn(OpenColumnTask) + Send + Sync),
) {
    while let Some(task) = partition_queue.pop_blocking() {
        if let Err(err) = plan_partition(&task, mkdir_mode, facade, column_queue, |t| on_inline(t)) {
            error!("partition plan failed for {:?}: {err}", task.partition_dir());
            task.done_latch.count_down();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooo::facade::StdFilesFacade;
    use crate::ooo::types::{ActiveColumn, CountdownLatch, OOOColumn, OooSlice};
    use crate::table::{ColumnDef, PartitionBy, StaticTableWriter, TableSchema, COLUMN_TYPE_INT, COLUMN_TYPE_TIMESTAMP};
    use std::sync::atomic::AtomicUsize;
    use tempfile::TempDir;

    #[test]
    fn test_worker_pool_drains_new_partition_task() {
        let dir = TempDir::new().unwrap();
        let schema = TableSchema::new(
            0,
            vec![
                ColumnDef { name: "timestamp".into(), type_code: COLUMN_TYPE_TIMESTAMP, indexed: false },
                ColumnDef { name: "value".into(), type_code: COLUMN_TYPE_INT, indexed: false },
            ],
        );
        let writer: Arc<dyn crate::table::TableWriter> = Arc::new(StaticTableWriter::new(schema));

        let mut sorted_bytes = Vec::new();
        sorted_bytes.extend_from_slice(&1_000_000i64.to_ne_bytes());
        sorted_bytes.extend_from_slice(&0i64.to_ne_bytes());
        let sorted = OooSlice::new(Arc::from(sorted_bytes.into_boxed_slice()), 0, 16);

        let done_latch = Arc::new(CountdownLatch::new(1));
        let task = Arc::new(PartitionTask {
            table_root: dir.path().to_path_buf(),
            partition_by: PartitionBy::Day,
            columns: vec![ActiveColumn { fix: crate::table::ColumnFd::None, var: None }; 2],
            ooo_columns: vec![OOOColumn { fix: OooSlice::empty(), var: None }; 2],
            src_ooo_lo: 0,
            src_ooo_hi: 0,
            src_ooo_max: 1,
            ooo_timestamp_min: 1_000_000,
            ooo_timestamp_max: 1_000_000,
            ooo_timestamp_hi: 1_000_000,
            txn: 1,
            sorted_timestamps: sorted,
            last_partition_size: 0,
            table_ceil_of_max_timestamp: 0,
            table_floor_of_min_timestamp: 0,
            table_floor_of_max_timestamp: 0,
            table_max_timestamp: 0,
            table_writer: writer,
            done_latch: done_latch.clone(),
        });

        let mut config = SpliceConfig::default();
        config.worker_threads = 1;
        // Force every column task onto the inline path so the test can
        // assert completion without a separate column-consumer thread.
        config.open_column_queue_capacity = 0;
        config.partition_queue_capacity = 4;

        let partition_queue = Arc::new(PartitionQueue::new(config.partition_queue_capacity));
        let column_queue = Arc::new(OpenColumnQueue::new(config.open_column_queue_capacity));
        let facade: Arc<dyn FilesFacade> = Arc::new(StdFilesFacade);
        let inline_count = Arc::new(AtomicUsize::new(0));
        let inline_count_worker = inline_count.clone();

        let pool = WorkerPool::spawn(&config, partition_queue.clone(), column_queue.clone(), facade, move |t| {
            inline_count_worker.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if t.column_counter.count_down() == 0 {
                t.done_latch.count_down();
            }
        });

        partition_queue.publish(task);
        done_latch.wait();
        partition_queue.close();
        pool.join();

        assert_eq!(inline_count.load(std::sync::atomic::Ordering::SeqCst), 2);
    }
}
