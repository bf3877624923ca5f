//! The validation pipeline.
//!
//! One unit of concurrency per table: worker threads pull table jobs from a
//! shared queue and send finished `TableResult`s over a channel to the
//! single aggregating receiver. Within a table, chunks are processed
//! sequentially by the worker that owns it, so peak memory is bounded by one
//! chunk's worth of records.

use std::collections::{BTreeSet, VecDeque};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, mpsc};
use std::time::Instant;

use tracing::{info, warn};

use datacert_model::{
    TableDescriptor, TableResult, TableStatus, ValidationReport, Violation, ViolationCategory,
};
use datacert_schema::{PlanModeOverride, RunConfig};
use datacert_store::TableStore;
use datacert_validate::{RecordValidator, ScanBudget, ScanMode, ScanPlan, plan, plan_forced};

use crate::aggregate::ReportBuilder;
use crate::cancel::CancelToken;

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Scan every row of every table, chunked to bound memory.
    pub exhaustive: bool,
    /// Worker thread count; 0 uses available parallelism.
    pub workers: usize,
}

/// Drives a full validation run over the configured tables.
pub struct Runner {
    validator: Arc<RecordValidator>,
    store: Arc<dyn TableStore>,
    config: RunConfig,
    options: RunOptions,
    schema_fingerprint: String,
}

impl Runner {
    pub fn new(
        validator: Arc<RecordValidator>,
        store: Arc<dyn TableStore>,
        config: RunConfig,
        options: RunOptions,
        schema_fingerprint: impl Into<String>,
    ) -> Self {
        Self {
            validator,
            store,
            config,
            options,
            schema_fingerprint: schema_fingerprint.into(),
        }
    }

    /// Validate every configured table and aggregate the outcome.
    ///
    /// Tables cancelled mid-scan are reported as such; tables never
    /// dispatched before cancellation do not appear in the report.
    pub fn run(&self, cancel: &CancelToken) -> ValidationReport {
        let descriptors: VecDeque<TableDescriptor> = self.config.descriptors().into();
        let worker_count = self.worker_count(descriptors.len());
        let queue = Mutex::new(descriptors);
        let (sender, receiver) = mpsc::channel::<TableResult>();

        let mut builder = ReportBuilder::new();
        std::thread::scope(|scope| {
            let queue = &queue;
            for _ in 0..worker_count {
                let sender = sender.clone();
                scope.spawn(move || {
                    loop {
                        if cancel.is_cancelled() {
                            break;
                        }
                        let descriptor = queue
                            .lock()
                            .expect("table queue lock poisoned")
                            .pop_front();
                        let Some(descriptor) = descriptor else {
                            break;
                        };
                        let result = self.validate_table(&descriptor, cancel);
                        if sender.send(result).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(sender);
            // Single merge point: no concurrent mutation of the report.
            for result in receiver.iter() {
                builder.merge(result);
            }
        });

        builder.finish(self.schema_fingerprint.as_str())
    }

    fn worker_count(&self, table_count: usize) -> usize {
        let requested = if self.options.workers == 0 {
            std::thread::available_parallelism()
                .map(std::num::NonZeroUsize::get)
                .unwrap_or(1)
        } else {
            self.options.workers
        };
        requested.min(table_count).max(1)
    }

    fn validate_table(&self, descriptor: &TableDescriptor, cancel: &CancelToken) -> TableResult {
        let start = Instant::now();
        info!(
            table = %descriptor.table_name,
            entity_type = %descriptor.entity_type_name,
            "validating table"
        );
        let mut result = TableResult::new(
            descriptor.table_name.as_str(),
            descriptor.entity_type_name.as_str(),
        );

        let entity = match self
            .validator
            .schema()
            .entity_type(&descriptor.entity_type_name)
        {
            Ok(entity) => entity,
            Err(error) => return self.operational_failure(result, &error.to_string(), start),
        };

        let total = match self.store.row_count(&descriptor.table_name) {
            Ok(total) => total,
            Err(error) => return self.operational_failure(result, &error.to_string(), start),
        };
        result.total_row_count = total;

        let plan = self.resolve_plan(&descriptor.table_name, total);
        result.sampled = plan.planned_rows < total;
        result.fk_unchecked_fields = self.validator.unchecked_foreign_keys(entity);

        // Duplicate detection for unique-key fields spans all chunks of the
        // table; a record-local validator cannot see other rows.
        let unique_fields: Vec<String> = entity
            .unique_keys()
            .map(|field| field.name.clone())
            .collect();
        let mut seen_keys: Vec<BTreeSet<String>> = vec![BTreeSet::new(); unique_fields.len()];

        let mut cancelled = false;
        for chunk in &plan.chunks {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            let batch = match self
                .store
                .read_batch(&descriptor.table_name, chunk.offset, chunk.len)
            {
                Ok(batch) => batch,
                Err(error) => {
                    warn!(
                        table = %descriptor.table_name,
                        error = %error,
                        "abandoning table after read failure"
                    );
                    result.record_violation(Violation::record(
                        chunk.offset,
                        ViolationCategory::Other,
                        format!("operational error: {error}"),
                    ));
                    break;
                }
            };

            for record in &batch.records {
                // One malformed row must not cost the report the rest of the
                // table: a panic is folded into a single `other` violation.
                let outcome =
                    catch_unwind(AssertUnwindSafe(|| self.validator.validate(record, entity)));
                match outcome {
                    Ok(violations) => {
                        for violation in violations {
                            result.record_violation(violation);
                        }
                    }
                    Err(_) => result.record_violation(Violation::record(
                        record.row_index,
                        ViolationCategory::Other,
                        format!("unexpected failure validating record {}", record.row_index),
                    )),
                }

                for (key_index, field_name) in unique_fields.iter().enumerate() {
                    if let Some(value) = record.get(field_name)
                        && !value.is_null()
                    {
                        let rendered = value.to_string();
                        if !seen_keys[key_index].insert(rendered.clone()) {
                            result.record_violation(
                                Violation::field(
                                    record.row_index,
                                    field_name.as_str(),
                                    ViolationCategory::Other,
                                    format!("duplicate value for unique-key field {field_name}"),
                                )
                                .with_observed(&rendered),
                            );
                        }
                    }
                }

                result.validated_row_count += 1;
            }
        }

        // Failed on the first violating chunk, but scanning continued above
        // so row-count bookkeeping stays accurate.
        result.status = if cancelled {
            TableStatus::Cancelled
        } else if result.violation_count == 0 {
            TableStatus::Passed
        } else {
            TableStatus::Failed
        };
        result.elapsed_ms = start.elapsed().as_millis() as u64;
        info!(
            table = %result.table_name,
            status = result.status.as_str(),
            rows = result.validated_row_count,
            violations = result.violation_count,
            elapsed_ms = result.elapsed_ms,
            "table validated"
        );
        result
    }

    fn operational_failure(
        &self,
        mut result: TableResult,
        message: &str,
        start: Instant,
    ) -> TableResult {
        warn!(table = %result.table_name, error = message, "table validation failed");
        result.record_violation(Violation::record(
            0,
            ViolationCategory::Other,
            format!("operational error: {message}"),
        ));
        result.status = TableStatus::Failed;
        result.elapsed_ms = start.elapsed().as_millis() as u64;
        result
    }

    /// Resolve the per-table override (if any) against the default budget,
    /// then delegate to the pure planner.
    fn resolve_plan(&self, table: &str, total_row_count: u64) -> ScanPlan {
        let mut budget = ScanBudget {
            full_scan_threshold: self.config.budget.full_scan_threshold,
            sample_cap: self.config.budget.sample_cap,
            chunk_size: self.config.budget.chunk_size,
        };
        if let Some(override_) = self.config.plan_override(table) {
            if let Some(cap) = override_.row_cap {
                budget.sample_cap = cap;
            }
            if let Some(size) = override_.chunk_size {
                budget.chunk_size = size;
            }
            if let Some(mode) = override_.mode {
                let forced = match mode {
                    PlanModeOverride::Full => ScanMode::Full,
                    PlanModeOverride::Sample => ScanMode::Sampled,
                };
                return plan_forced(total_row_count, budget, forced);
            }
        }
        plan(total_row_count, budget, self.options.exhaustive)
    }
}
