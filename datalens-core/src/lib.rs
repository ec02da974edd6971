pub mod export;
pub mod loader;
pub mod profile;
pub mod table;

pub use datalens_common::{DatalensError, Result};
pub use export::{
    export_json, export_parquet, export_summary_csv, print_summary, write_json, write_summary,
    write_summary_csv,
};
pub use loader::{
    load_batches, load_table, load_table_from_bytes, read_batches, table_from_batches, LoadOptions,
    TableFormat,
};
pub use profile::{
    profile, profile_with, BasicStats, ColumnMap, ColumnProfile, Histogram, Measure, Profile,
    ProfileOptions, SummaryRow, DEFAULT_HIST_BINS,
};
pub use table::{Column, ColumnKind, ColumnValues, Table};
