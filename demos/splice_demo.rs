//! Drives the splice planner once against a scratch table directory and
//! prints the resulting block plan and open-column mode. Not part of the
//! library's public contract — a manual inspection aid only.

use std::env;
use std::fs;
use std::process::ExitCode;
use std::sync::Arc;

use log::info;
use partition_splicer::ooo::facade::StdFilesFacade;
use partition_splicer::ooo::types::{ActiveColumn, CountdownLatch, OOOColumn, OooSlice};
use partition_splicer::ooo::{open_partition, plan_partition, OpenColumnQueue};
use partition_splicer::table::{
    ColumnDef, ColumnFd, PartitionBy, StaticTableWriter, TableSchema, COLUMN_TYPE_INT, COLUMN_TYPE_TIMESTAMP,
};

fn main() -> ExitCode {
    env_logger::init();

    let table_root = env::args().nth(1).map(std::path::PathBuf::from).unwrap_or_else(|| {
        let dir = env::temp_dir().join("partition-splicer-demo");
        let _ = fs::remove_dir_all(&dir);
        dir
    });

    if let Err(err) = run(&table_root) {
        eprintln!("demo failed: {err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn run(table_root: &std::path::Path) -> partition_splicer::Result<()> {
    let partition_dir = table_root.join("1970-01-01");
    fs::create_dir_all(&partition_dir).expect("create scratch partition dir");

    let mut data_bytes = Vec::new();
    for ts in [10i64, 20, 30, 40, 50] {
        data_bytes.extend_from_slice(&ts.to_ne_bytes());
    }
    fs::write(partition_dir.join("timestamp.d"), data_bytes).expect("write scratch timestamp column");

    let ooo_ts = [22i64, 25, 35];
    let mut sorted_bytes = Vec::new();
    for (row, ts) in ooo_ts.iter().enumerate() {
        sorted_bytes.extend_from_slice(&ts.to_ne_bytes());
        sorted_bytes.extend_from_slice(&(row as i64).to_ne_bytes());
    }
    let sorted = OooSlice::new(Arc::from(sorted_bytes.into_boxed_slice()), 0, sorted_bytes.len());

    let schema = TableSchema::new(
        0,
        vec![
            ColumnDef { name: "timestamp".into(), type_code: COLUMN_TYPE_TIMESTAMP, indexed: false },
            ColumnDef { name: "value".into(), type_code: COLUMN_TYPE_INT, indexed: false },
        ],
    );
    let table_writer: Arc<dyn partition_splicer::table::TableWriter> = Arc::new(StaticTableWriter::new(schema));

    let task = partition_splicer::ooo::types::PartitionTask {
        table_root: table_root.to_path_buf(),
        partition_by: PartitionBy::Day,
        columns: vec![ActiveColumn { fix: ColumnFd::None, var: None }; 2],
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
        table_writer,
        done_latch: Arc::new(CountdownLatch::new(1)),
    };

    let facade = StdFilesFacade;
    let opened = open_partition(&task, 0o750, &facade)?;
    info!("mode={:?} plan={:?}", opened.mode, opened.plan);
    println!("mode: {:?}", opened.mode);
    println!("prefix: {:?}", opened.plan.prefix);
    println!("merge:  {:?}", opened.plan.merge);
    println!("suffix: {:?}", opened.plan.suffix);

    let queue = OpenColumnQueue::new(8);
    plan_partition(&task, 0o750, &facade, &queue, |t| {
        t.column_counter.count_down();
    })?;
    while let Some(t) = queue.pop() {
        println!("column {} ({:?}) merge_index={}", t.column_index, t.column_role, t.merge_index.is_some());
        t.column_counter.count_down();
    }

    Ok(())
}
