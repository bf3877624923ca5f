//! Table access over partitioned CSV storage.
//!
//! A table reference resolves to either `<data_dir>/<name>.csv` (single
//! file) or `<data_dir>/<name>/` holding one CSV per partition. A
//! partitioned table's logical row order is the concatenation of its
//! partitions in lexicographic file-name order; chunked validation relies
//! on that order being stable across runs.
//!
//! Row counts come from a lazy `len()` aggregation per partition, so sizing
//! a table never materializes its rows.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use polars::prelude::{
    AnyValue, DataFrame, IdxSize, LazyCsvReader, LazyFileListReader, LazyFrame, PlPath, len,
};

use datacert_model::{Record, RecordBatch};

use crate::convert::any_to_value;
use crate::error::{Result, StoreError};

/// Read access to named tables. Shared across table workers; implementations
/// must be safe to call concurrently.
pub trait TableStore: Send + Sync {
    /// Total logical row count, computed from per-partition metadata.
    fn row_count(&self, table: &str) -> Result<u64>;

    /// Records for the logical range `[offset, offset + limit)`. Returns
    /// fewer than `limit` records only at end of table.
    fn read_batch(&self, table: &str, offset: u64, limit: u64) -> Result<RecordBatch>;
}

#[derive(Debug, Clone)]
struct Partition {
    path: PathBuf,
    rows: u64,
}

#[derive(Debug, Clone)]
struct TableLayout {
    partitions: Vec<Partition>,
    total_rows: u64,
}

/// Polars-backed store over a directory of CSV tables.
pub struct CsvStore {
    data_dir: PathBuf,
    /// Partition layouts discovered lazily, one entry per table.
    layouts: Mutex<BTreeMap<String, Arc<TableLayout>>>,
}

impl CsvStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            layouts: Mutex::new(BTreeMap::new()),
        }
    }

    fn layout(&self, table: &str) -> Result<Arc<TableLayout>> {
        if let Some(layout) = self
            .layouts
            .lock()
            .expect("layout cache lock poisoned")
            .get(table)
        {
            return Ok(Arc::clone(layout));
        }

        let paths = self.resolve_partitions(table)?;
        let mut partitions = Vec::with_capacity(paths.len());
        let mut total_rows = 0u64;
        for path in paths {
            let rows = partition_row_count(&path)?;
            tracing::debug!(table, partition = %path.display(), rows, "sized partition");
            total_rows += rows;
            partitions.push(Partition { path, rows });
        }

        let layout = Arc::new(TableLayout {
            partitions,
            total_rows,
        });
        self.layouts
            .lock()
            .expect("layout cache lock poisoned")
            .insert(table.to_string(), Arc::clone(&layout));
        Ok(layout)
    }

    fn resolve_partitions(&self, table: &str) -> Result<Vec<PathBuf>> {
        let single = self.data_dir.join(format!("{table}.csv"));
        if single.is_file() {
            return Ok(vec![single]);
        }

        let dir = self.data_dir.join(table);
        if !dir.is_dir() {
            return Err(StoreError::TableNotFound {
                table: table.to_string(),
            });
        }

        let entries = std::fs::read_dir(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                path: dir.clone(),
                source,
            })?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let is_csv = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("csv"))
                .unwrap_or(false);
            if is_csv {
                paths.push(path);
            }
        }
        if paths.is_empty() {
            return Err(StoreError::TableNotFound {
                table: table.to_string(),
            });
        }
        // Lexicographic partition order defines the logical row order.
        paths.sort();
        Ok(paths)
    }
}

impl TableStore for CsvStore {
    fn row_count(&self, table: &str) -> Result<u64> {
        Ok(self.layout(table)?.total_rows)
    }

    fn read_batch(&self, table: &str, offset: u64, limit: u64) -> Result<RecordBatch> {
        let layout = self.layout(table)?;
        let mut records = Vec::new();
        if offset >= layout.total_rows || limit == 0 {
            return Ok(RecordBatch { offset, records });
        }

        let end = (offset + limit).min(layout.total_rows);
        let mut partition_start = 0u64;
        for partition in &layout.partitions {
            let partition_end = partition_start + partition.rows;
            if partition_end <= offset {
                partition_start = partition_end;
                continue;
            }
            if partition_start >= end {
                break;
            }

            let local_offset = offset.max(partition_start) - partition_start;
            let local_len = end.min(partition_end) - partition_start - local_offset;
            let df = scan_csv(&partition.path)?
                .slice(local_offset as i64, local_len as IdxSize)
                .collect()
                .map_err(|error| StoreError::scan(&partition.path, error))?;
            append_records(&df, partition_start + local_offset, &mut records);

            partition_start = partition_end;
        }

        Ok(RecordBatch { offset, records })
    }
}

fn scan_csv(path: &Path) -> Result<LazyFrame> {
    let path_str = path.to_string_lossy();
    LazyCsvReader::new(PlPath::new(&path_str))
        .with_has_header(true)
        .finish()
        .map_err(|error| StoreError::scan(path, error))
}

fn partition_row_count(path: &Path) -> Result<u64> {
    let df = scan_csv(path)?
        .select([len().alias("rows")])
        .collect()
        .map_err(|error| StoreError::scan(path, error))?;
    let value = df
        .column("rows")
        .and_then(|column| column.get(0))
        .map_err(|error| StoreError::scan(path, error))?;
    Ok(match value {
        AnyValue::UInt32(v) => u64::from(v),
        AnyValue::UInt64(v) => v,
        AnyValue::Int64(v) => v.max(0) as u64,
        _ => 0,
    })
}

fn append_records(df: &DataFrame, first_row_index: u64, records: &mut Vec<Record>) {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let columns = df.get_columns();
    for row in 0..df.height() {
        let mut values = BTreeMap::new();
        for (name, column) in names.iter().zip(columns) {
            let cell = column.get(row).unwrap_or(AnyValue::Null);
            values.insert(name.clone(), any_to_value(cell));
        }
        records.push(Record::new(first_row_index + row as u64, values));
    }
}
