//! Table-level concerns: configuration, partition naming, and the schema
//! handle the splice planner reads column metadata through.

pub mod config;
pub mod metadata;
pub mod partitioning;

pub use config::SpliceConfig;
pub use metadata::{
    is_var_width, ActiveColumnFds, ColumnDef, ColumnFd, ColumnTypeCode, StaticTableWriter, TableSchema, TableWriter,
    COLUMN_TYPE_BINARY, COLUMN_TYPE_DOUBLE, COLUMN_TYPE_INT, COLUMN_TYPE_LONG, COLUMN_TYPE_STRING, COLUMN_TYPE_TIMESTAMP,
};
pub use partitioning::PartitionBy;
