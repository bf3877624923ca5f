//! End-to-end pipeline tests over an in-memory table store.

use std::collections::BTreeMap;
use std::sync::Arc;

use datacert_engine::{CancelToken, RunOptions, Runner};
use datacert_model::{
    DeclaredType, EntityType, FieldConstraint, Record, RecordBatch, SchemaModel, TableStatus,
    Value, ViolationCategory,
};
use datacert_schema::{BudgetConfig, RunConfig, TableBinding};
use datacert_store::{StoreError, TableStore};
use datacert_validate::RecordValidator;

fn make_field(name: &str, declared_type: DeclaredType) -> FieldConstraint {
    FieldConstraint {
        name: name.to_string(),
        declared_type,
        required: false,
        is_identifier: false,
        is_unique_key: false,
        foreign_key_target: None,
        pattern: None,
        min_value: None,
        max_value: None,
        multivalued: false,
        allowed_values: None,
    }
}

fn make_record(index: u64, pairs: &[(&str, Value)]) -> Record {
    let values: BTreeMap<String, Value> = pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect();
    Record::new(index, values)
}

struct MemStore {
    tables: BTreeMap<String, Vec<Record>>,
}

impl MemStore {
    fn new() -> Self {
        Self {
            tables: BTreeMap::new(),
        }
    }

    fn with_table(mut self, name: &str, records: Vec<Record>) -> Self {
        self.tables.insert(name.to_string(), records);
        self
    }
}

impl TableStore for MemStore {
    fn row_count(&self, table: &str) -> Result<u64, StoreError> {
        self.tables
            .get(table)
            .map(|records| records.len() as u64)
            .ok_or_else(|| StoreError::TableNotFound {
                table: table.to_string(),
            })
    }

    fn read_batch(&self, table: &str, offset: u64, limit: u64) -> Result<RecordBatch, StoreError> {
        let records = self
            .tables
            .get(table)
            .ok_or_else(|| StoreError::TableNotFound {
                table: table.to_string(),
            })?;
        let start = (offset as usize).min(records.len());
        let end = (offset as usize + limit as usize).min(records.len());
        Ok(RecordBatch {
            offset,
            records: records[start..end].to_vec(),
        })
    }
}

/// Store wrapper that fires the cancellation signal while a chosen table's
/// first chunk is being read, modelling a mid-run cancel.
struct CancellingStore {
    inner: MemStore,
    cancel: CancelToken,
    trigger_table: String,
}

impl TableStore for CancellingStore {
    fn row_count(&self, table: &str) -> Result<u64, StoreError> {
        self.inner.row_count(table)
    }

    fn read_batch(&self, table: &str, offset: u64, limit: u64) -> Result<RecordBatch, StoreError> {
        if table == self.trigger_table {
            self.cancel.cancel();
        }
        self.inner.read_batch(table, offset, limit)
    }
}

fn config_for(tables: &[(&str, &str)], budget: BudgetConfig) -> RunConfig {
    RunConfig {
        tables: tables
            .iter()
            .map(|(table, entity)| {
                (
                    table.to_string(),
                    TableBinding {
                        entity_type: entity.to_string(),
                        plan: None,
                    },
                )
            })
            .collect(),
        budget,
    }
}

fn sample_entity() -> EntityType {
    let mut id = make_field("id", DeclaredType::Integer);
    id.required = true;
    let mut code = make_field("code", DeclaredType::String);
    code.required = true;
    EntityType {
        name: "Sample".to_string(),
        fields: vec![id, code],
    }
}

fn runner_for(
    entity: EntityType,
    store: Arc<dyn TableStore>,
    config: RunConfig,
    options: RunOptions,
) -> Runner {
    let schema = Arc::new(SchemaModel::new(vec![entity]));
    let validator = Arc::new(RecordValidator::new(schema).expect("validator"));
    Runner::new(validator, store, config, options, "test-fingerprint")
}

/// Rows 0..count with sequential ids; `missing_code_at` rows omit the
/// required `code` field.
fn synthetic_rows(count: u64, missing_code_at: &[u64]) -> Vec<Record> {
    (0..count)
        .map(|index| {
            if missing_code_at.contains(&index) {
                make_record(index, &[("id", Value::Int(index as i64))])
            } else {
                make_record(
                    index,
                    &[
                        ("id", Value::Int(index as i64)),
                        ("code", Value::Str(format!("C{index}"))),
                    ],
                )
            }
        })
        .collect()
}

#[test]
fn all_valid_table_passes() {
    let store = Arc::new(MemStore::new().with_table("samples", synthetic_rows(3, &[])));
    let config = config_for(&[("samples", "Sample")], BudgetConfig::default());
    let runner = runner_for(sample_entity(), store, config, RunOptions::default());

    let report = runner.run(&CancelToken::new());
    assert!(report.all_passed());
    let table = &report.tables[0];
    assert_eq!(table.status, TableStatus::Passed);
    assert_eq!(table.violation_count, 0);
    assert_eq!(table.total_row_count, 3);
    assert_eq!(table.validated_row_count, 3);
    assert!(!table.sampled);
    assert_eq!(report.summary.tables_passed, 1);
}

#[test]
fn partition_invariance_across_chunk_sizes() {
    let missing = [100, 500, 900];
    for chunk_size in [100u64, 250, 1_000] {
        let store = Arc::new(MemStore::new().with_table("big", synthetic_rows(1_000, &missing)));
        let budget = BudgetConfig {
            full_scan_threshold: 0,
            sample_cap: 1_000,
            chunk_size,
        };
        let config = config_for(&[("big", "Sample")], budget);
        let runner = runner_for(sample_entity(), store, config, RunOptions::default());

        let report = runner.run(&CancelToken::new());
        let table = &report.tables[0];
        assert_eq!(
            table.violation_count, 3,
            "chunk size {chunk_size} changed the violation count"
        );
        assert_eq!(
            table.histogram.get(&ViolationCategory::MissingRequired),
            Some(&3),
            "chunk size {chunk_size} changed the per-category counts"
        );
        // Row-count conservation: a full scan validates every row.
        assert_eq!(table.validated_row_count, 1_000);
        assert_eq!(table.total_row_count, 1_000);
        assert_eq!(table.status, TableStatus::Failed);
    }
}

#[test]
fn sampling_boundary_reports_both_counts() {
    let store = Arc::new(MemStore::new().with_table("big", synthetic_rows(1_000, &[])));
    let budget = BudgetConfig {
        full_scan_threshold: 100,
        sample_cap: 50,
        chunk_size: 25,
    };
    let config = config_for(&[("big", "Sample")], budget);
    let runner = runner_for(sample_entity(), store, config, RunOptions::default());

    let report = runner.run(&CancelToken::new());
    let table = &report.tables[0];
    assert_eq!(table.validated_row_count, 50);
    assert_eq!(table.total_row_count, 1_000);
    assert!(table.sampled);
    assert_eq!(table.status, TableStatus::Passed);
}

#[test]
fn unexpected_column_is_one_schema_mismatch() {
    let rows = vec![make_record(
        0,
        &[
            ("id", Value::Int(1)),
            ("code", Value::Str("C1".to_string())),
            ("extra_field", Value::Str("surprise".to_string())),
        ],
    )];
    let store = Arc::new(MemStore::new().with_table("samples", rows));
    let config = config_for(&[("samples", "Sample")], BudgetConfig::default());
    let runner = runner_for(sample_entity(), store, config, RunOptions::default());

    let report = runner.run(&CancelToken::new());
    let table = &report.tables[0];
    assert_eq!(table.violation_count, 1);
    assert_eq!(
        table.violations[0].category,
        ViolationCategory::SchemaMismatch
    );
    assert_eq!(table.violations[0].field_name.as_deref(), Some("extra_field"));
}

#[test]
fn cancellation_mid_run_marks_in_flight_table_cancelled() {
    let cancel = CancelToken::new();
    let store = Arc::new(CancellingStore {
        inner: MemStore::new()
            .with_table("a_table", synthetic_rows(3, &[]))
            .with_table("b_table", synthetic_rows(10, &[])),
        cancel: cancel.clone(),
        trigger_table: "b_table".to_string(),
    });
    // Chunked so table b has work left to abandon after its first chunk.
    let budget = BudgetConfig {
        full_scan_threshold: 0,
        sample_cap: 100,
        chunk_size: 5,
    };
    let config = config_for(&[("a_table", "Sample"), ("b_table", "Sample")], budget);
    let options = RunOptions {
        exhaustive: false,
        workers: 1,
    };
    let runner = runner_for(sample_entity(), store, config, options);

    let report = runner.run(&cancel);
    assert_eq!(report.tables.len(), 2);

    let a = &report.tables[0];
    assert_eq!(a.table_name, "a_table");
    assert_eq!(a.status, TableStatus::Passed);

    let b = &report.tables[1];
    assert_eq!(b.table_name, "b_table");
    assert_eq!(b.status, TableStatus::Cancelled);
    assert!(b.validated_row_count < b.total_row_count);
    // The in-flight chunk is finished before the table is abandoned.
    assert_eq!(b.validated_row_count, 5);
    assert_eq!(report.summary.tables_cancelled, 1);
}

#[test]
fn missing_table_fails_without_aborting_the_run() {
    let store = Arc::new(MemStore::new().with_table("present", synthetic_rows(2, &[])));
    let config = config_for(
        &[("present", "Sample"), ("ghost", "Sample")],
        BudgetConfig::default(),
    );
    let runner = runner_for(sample_entity(), store, config, RunOptions::default());

    let report = runner.run(&CancelToken::new());
    assert_eq!(report.tables.len(), 2);

    let ghost = report
        .tables
        .iter()
        .find(|table| table.table_name == "ghost")
        .expect("ghost table reported");
    assert_eq!(ghost.status, TableStatus::Failed);
    assert_eq!(ghost.violation_count, 1);
    assert_eq!(ghost.violations[0].category, ViolationCategory::Other);
    assert!(ghost.violations[0].message.contains("operational error"));

    let present = report
        .tables
        .iter()
        .find(|table| table.table_name == "present")
        .expect("present table reported");
    assert_eq!(present.status, TableStatus::Passed);
}

#[test]
fn duplicate_unique_key_values_are_detected_across_chunks() {
    let mut id = make_field("id", DeclaredType::String);
    id.required = true;
    id.is_unique_key = true;
    let entity = EntityType {
        name: "Keyed".to_string(),
        fields: vec![id],
    };

    let rows = vec![
        make_record(0, &[("id", Value::Str("A".to_string()))]),
        make_record(1, &[("id", Value::Str("B".to_string()))]),
        make_record(2, &[("id", Value::Str("A".to_string()))]),
    ];
    let store = Arc::new(MemStore::new().with_table("keyed", rows));
    // Chunk size 1 places the duplicate pair in different chunks.
    let budget = BudgetConfig {
        full_scan_threshold: 0,
        sample_cap: 10,
        chunk_size: 1,
    };
    let config = config_for(&[("keyed", "Keyed")], budget);
    let runner = runner_for(entity, store, config, RunOptions::default());

    let report = runner.run(&CancelToken::new());
    let table = &report.tables[0];
    assert_eq!(table.violation_count, 1);
    assert_eq!(table.violations[0].record_index, 2);
    assert!(table.violations[0].message.contains("duplicate value"));
}

#[test]
fn repeated_runs_produce_identical_reports_modulo_elapsed() {
    let missing = [1, 7];
    let build = || {
        let store = Arc::new(MemStore::new().with_table("samples", synthetic_rows(20, &missing)));
        let config = config_for(&[("samples", "Sample")], BudgetConfig::default());
        runner_for(sample_entity(), store, config, RunOptions::default())
    };

    let mut first = build().run(&CancelToken::new());
    let mut second = build().run(&CancelToken::new());
    for table in first.tables.iter_mut().chain(second.tables.iter_mut()) {
        table.elapsed_ms = 0;
    }

    let first_json = serde_json::to_string(&first).expect("serialize first");
    let second_json = serde_json::to_string(&second).expect("serialize second");
    assert_eq!(first_json, second_json);
}
