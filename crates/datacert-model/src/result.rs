use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::violation::{Violation, ViolationCategory};

/// Per-table violation sample cap; `violation_count` carries the true count.
pub const VIOLATION_SAMPLE_CAP: usize = 100;

/// Maps a physical table to the entity type it is validated against.
/// Built once per run from the configured mapping; immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub table_name: String,
    pub entity_type_name: String,
}

/// Terminal table states. A failed table is reported, not re-attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    Passed,
    Failed,
    Cancelled,
}

impl TableStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TableStatus::Passed => "passed",
            TableStatus::Failed => "failed",
            TableStatus::Cancelled => "cancelled",
        }
    }
}

/// Per-table validation outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableResult {
    pub table_name: String,
    pub entity_type_name: String,
    pub total_row_count: u64,
    pub validated_row_count: u64,
    pub status: TableStatus,
    /// True when the scan covered a size-capped sample rather than all rows.
    pub sampled: bool,
    /// Capped sample of violations; see `VIOLATION_SAMPLE_CAP`.
    pub violations: Vec<Violation>,
    /// Untruncated true count.
    pub violation_count: u64,
    /// Untruncated per-category counts.
    pub histogram: BTreeMap<ViolationCategory, u64>,
    /// Foreign-key constraints skipped because no identifier index covered
    /// their target. Surfaced rather than silently passed.
    pub fk_unchecked_fields: Vec<String>,
    pub elapsed_ms: u64,
}

impl TableResult {
    pub fn new(table_name: impl Into<String>, entity_type_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            entity_type_name: entity_type_name.into(),
            total_row_count: 0,
            validated_row_count: 0,
            status: TableStatus::Passed,
            sampled: false,
            violations: Vec::new(),
            violation_count: 0,
            histogram: BTreeMap::new(),
            fk_unchecked_fields: Vec::new(),
            elapsed_ms: 0,
        }
    }

    pub fn passed(&self) -> bool {
        self.status == TableStatus::Passed
    }

    /// Count a violation, keeping at most `VIOLATION_SAMPLE_CAP` samples.
    /// The histogram and `violation_count` always reflect the full tally.
    pub fn record_violation(&mut self, violation: Violation) {
        self.violation_count += 1;
        *self.histogram.entry(violation.category).or_insert(0) += 1;
        if self.violations.len() < VIOLATION_SAMPLE_CAP {
            self.violations.push(violation);
        }
    }
}

/// Corpus-wide summary counters.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    pub tables_validated: u64,
    pub tables_passed: u64,
    pub tables_failed: u64,
    pub tables_cancelled: u64,
    pub rows_validated: u64,
    pub total_violations: u64,
}

/// Corpus-wide outcome. Created fresh per run; immutable once emitted.
///
/// `tables` is sorted by table name before emission so reports stay diffable
/// across runs regardless of completion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// sha256 of the schema document the run validated against.
    pub schema_fingerprint: String,
    pub tables: Vec<TableResult>,
    pub histogram: BTreeMap<ViolationCategory, u64>,
    pub summary: ReportSummary,
}

impl ValidationReport {
    pub fn all_passed(&self) -> bool {
        self.tables.iter().all(TableResult::passed)
    }

    pub fn failed_tables(&self) -> impl Iterator<Item = &TableResult> {
        self.tables
            .iter()
            .filter(|table| table.status == TableStatus::Failed)
    }

    pub fn passed_tables(&self) -> impl Iterator<Item = &TableResult> {
        self.tables.iter().filter(|table| table.passed())
    }
}
