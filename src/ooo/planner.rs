//! Top-level orchestration: ties the opener (C3), classifier (C1, invoked
//! from within the opener), merge-index builder (C4) and publisher (C5)
//! together for one partition task.

use std::sync::Arc;

use crate::core::Result;
use crate::ooo::merge_index::build_merge_index;
use crate::ooo::opener::open_partition;
use crate::ooo::publisher::{publish_columns, OpenColumnQueue};
use crate::ooo::types::{BlockKind, FilesFacade, OpenColumnTask, PartitionTask};

/// Plans one partition: opens it, builds a merge index if the classifier
/// found an overlapping run, and publishes one column task per table
/// column. `on_inline` runs a column task synchronously whenever the
/// open-column queue is saturated.
pub fn plan_partition(
    task: &PartitionTask,
    mkdir_mode: u32,
    facade: &dyn FilesFacade,
    column_queue: &OpenColumnQueue,
    on_inline: impl FnMut(OpenColumnTask),
) -> Result<()> {
    let opened = open_partition(task, mkdir_mode, facade)?;

    let merge_index = if opened.plan.merge.kind == BlockKind::Merge {
        let mapped = opened
            .src_timestamp
            .as_ref()
            .expect("a MERGE block implies the data-side timestamp column was mapped");
        let data_ts_all = mapped.as_i64_slice();
        let data_ts = &data_ts_all[..opened.src_data_max as usize];

        let ooo_pairs = task.sorted_timestamps.as_ts_rowid_pairs();
        let ooo_ts: Vec<i64> = (task.src_ooo_lo..=task.src_ooo_hi).map(|g| ooo_pairs[g as usize].0).collect();

        Some(Arc::new(build_merge_index(data_ts, &ooo_ts, task.src_ooo_lo, &opened.plan.merge)))
    } else {
        None
    };

    publish_columns(
        &opened,
        &task.columns,
        &task.ooo_columns,
        task.table_writer.as_ref(),
        merge_index,
        task.done_latch.clone(),
        column_queue,
        on_inline,
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooo::facade::StdFilesFacade;
    use crate::ooo::types::{ActiveColumn, CountdownLatch, OOOColumn, OooSlice};
    use crate::table::{ColumnDef, PartitionBy, StaticTableWriter, TableSchema, COLUMN_TYPE_INT, COLUMN_TYPE_TIMESTAMP};
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn write_i64_column(path: &std::path::Path, values: &[i64]) {
        let mut bytes = Vec::with_capacity(values.len() * 8);
        for v in values {
            bytes.extend_from_slice(&v.to_ne_bytes());
        }
        fs::write(path, bytes).unwrap();
    }

    #[test]
    fn test_plan_partition_merge_end_to_end() {
        let dir = TempDir::new().unwrap();
        // ooo_timestamp_lo = 22, epoch day 0 -> directory "1970-01-01".
        let partition_dir = dir.path().join("1970-01-01");
        fs::create_dir_all(&partition_dir).unwrap();
        write_i64_column(&partition_dir.join("timestamp.d"), &[10, 20, 30, 40, 50]);

        let ooo_ts = [22i64, 25, 35];
        let mut sorted_bytes = Vec::new();
        for (i, ts) in ooo_ts.iter().enumerate() {
            sorted_bytes.extend_from_slice(&ts.to_ne_bytes());
            sorted_bytes.extend_from_slice(&(i as i64).to_ne_bytes());
        }
        let sorted = OooSlice::new(Arc::from(sorted_bytes.into_boxed_slice()), 0, ooo_ts.len() * 16);

        let schema = TableSchema::new(
            0,
            vec![
                ColumnDef { name: "timestamp".into(), type_code: COLUMN_TYPE_TIMESTAMP, indexed: false },
                ColumnDef { name: "value".into(), type_code: COLUMN_TYPE_INT, indexed: false },
            ],
        );
        let writer: Arc<dyn crate::table::TableWriter> = Arc::new(StaticTableWriter::new(schema));

        let task = PartitionTask {
            table_root: dir.path().to_path_buf(),
            partition_by: PartitionBy::Day,
            columns: vec![ActiveColumn { fix: crate::table::ColumnFd::None, var: None }; 2],
            ooo_columns: vec![OOOColumn { fix: OooSlice::empty(), var: None }; 2],
            src_ooo_lo: 0,
            src_ooo_hi: 2,
            src_ooo_max: 3,
            ooo_timestamp_min: 22,
            ooo_timestamp_max: 35,
            ooo_timestamp_hi: 35,
            txn: 1,
            sorted_timestamps: sorted,
            last_partition_size: 0,
            table_ceil_of_max_timestamp: 1_000_000,
            table_floor_of_min_timestamp: 0,
            table_floor_of_max_timestamp: 0,
            table_max_timestamp: 1_000_000,
            table_writer: writer,
            done_latch: Arc::new(CountdownLatch::new(1)),
        };

        let queue = OpenColumnQueue::new(8);
        let facade = StdFilesFacade;
        let completed = AtomicUsize::new(0);

        plan_partition(&task, 0o750, &facade, &queue, |t| {
            completed.fetch_add(1, Ordering::SeqCst);
            t.column_counter.count_down();
        })
        .unwrap();

        let mut seen = 0;
        while let Some(t) = queue.pop() {
            seen += 1;
            assert!(t.merge_index.is_some());
            t.column_counter.count_down();
        }
        assert_eq!(seen + completed.load(Ordering::SeqCst), 2);
    }
}
