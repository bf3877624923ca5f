//! Result aggregation.
//!
//! Violation categories are produced at the point of detection; the
//! aggregator strictly accumulates. `merge` must be called exactly once per
//! table result (caller discipline; the runner's single receiver loop
//! guarantees it), and `finish` freezes the corpus-wide report.

use std::collections::BTreeMap;

use datacert_model::{
    ReportSummary, TableResult, TableStatus, ValidationReport, ViolationCategory,
};

#[derive(Debug, Default)]
pub struct ReportBuilder {
    tables: Vec<TableResult>,
    histogram: BTreeMap<ViolationCategory, u64>,
    summary: ReportSummary,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one table's outcome into the report. Calling twice for the same
    /// table double-counts.
    pub fn merge(&mut self, result: TableResult) {
        self.summary.tables_validated += 1;
        match result.status {
            TableStatus::Passed => self.summary.tables_passed += 1,
            TableStatus::Failed => self.summary.tables_failed += 1,
            TableStatus::Cancelled => self.summary.tables_cancelled += 1,
        }
        self.summary.rows_validated += result.validated_row_count;
        self.summary.total_violations += result.violation_count;
        for (category, count) in &result.histogram {
            *self.histogram.entry(*category).or_insert(0) += count;
        }
        self.tables.push(result);
    }

    /// Freeze the report. Tables are sorted by name so emission order is
    /// independent of completion order.
    pub fn finish(mut self, schema_fingerprint: impl Into<String>) -> ValidationReport {
        self.tables
            .sort_by(|a, b| a.table_name.cmp(&b.table_name));
        ValidationReport {
            schema_fingerprint: schema_fingerprint.into(),
            tables: self.tables,
            histogram: self.histogram,
            summary: self.summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datacert_model::{Violation, ViolationCategory};

    #[test]
    fn merge_accumulates_and_finish_sorts() {
        let mut builder = ReportBuilder::new();

        let mut zulu = TableResult::new("zulu", "Z");
        zulu.validated_row_count = 10;
        zulu.status = TableStatus::Failed;
        zulu.record_violation(Violation::record(
            3,
            ViolationCategory::TypeViolation,
            "bad type",
        ));
        builder.merge(zulu);

        let mut alpha = TableResult::new("alpha", "A");
        alpha.validated_row_count = 5;
        builder.merge(alpha);

        let report = builder.finish("fp");
        assert_eq!(report.tables[0].table_name, "alpha");
        assert_eq!(report.tables[1].table_name, "zulu");
        assert_eq!(report.summary.tables_validated, 2);
        assert_eq!(report.summary.tables_passed, 1);
        assert_eq!(report.summary.tables_failed, 1);
        assert_eq!(report.summary.rows_validated, 15);
        assert_eq!(report.summary.total_violations, 1);
        assert_eq!(
            report.histogram.get(&ViolationCategory::TypeViolation),
            Some(&1)
        );
    }
}
