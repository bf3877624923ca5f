//! Human-readable report emission.
//!
//! Pure function of the `ValidationReport`: no recomputation, no I/O. The
//! recommendations section is driven purely by which violation categories
//! carry nonzero counts.

use std::fmt::Write as _;

use datacert_model::{TableResult, ValidationReport, ViolationCategory};

/// Sample violations shown per failed table.
const FAILED_TABLE_SAMPLE: usize = 10;

pub fn to_markdown(report: &ValidationReport, generated_at: &str) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "# Data Validation Report");
    let _ = writeln!(out);
    let _ = writeln!(out, "Generated: {generated_at}");
    let _ = writeln!(out, "Schema fingerprint: `{}`", report.schema_fingerprint);
    let _ = writeln!(out);

    summary_section(&mut out, report);
    histogram_section(&mut out, report);
    failed_tables_section(&mut out, report);
    passed_tables_section(&mut out, report);
    results_table_section(&mut out, report);
    unchecked_fk_section(&mut out, report);
    recommendations_section(&mut out, report);

    out
}

fn summary_section(out: &mut String, report: &ValidationReport) {
    let summary = &report.summary;
    let _ = writeln!(out, "## Summary");
    let _ = writeln!(out);
    let _ = writeln!(out, "- Tables validated: {}", summary.tables_validated);
    let _ = writeln!(out, "- Tables passed: {}", summary.tables_passed);
    let _ = writeln!(out, "- Tables failed: {}", summary.tables_failed);
    if summary.tables_cancelled > 0 {
        let _ = writeln!(out, "- Tables cancelled: {}", summary.tables_cancelled);
    }
    let _ = writeln!(out, "- Rows validated: {}", summary.rows_validated);
    let _ = writeln!(out, "- Total violations: {}", summary.total_violations);
    let _ = writeln!(out);
}

fn histogram_section(out: &mut String, report: &ValidationReport) {
    let _ = writeln!(out, "## Violations by category");
    let _ = writeln!(out);
    let mut entries: Vec<(ViolationCategory, u64)> = report
        .histogram
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(category, count)| (*category, *count))
        .collect();
    if entries.is_empty() {
        let _ = writeln!(out, "No violations detected.");
        let _ = writeln!(out);
        return;
    }
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.as_str().cmp(b.0.as_str())));
    let _ = writeln!(out, "| Category | Count |");
    let _ = writeln!(out, "| --- | ---: |");
    for (category, count) in entries {
        let _ = writeln!(out, "| {category} | {count} |");
    }
    let _ = writeln!(out);
}

fn failed_tables_section(out: &mut String, report: &ValidationReport) {
    let failed: Vec<&TableResult> = report.failed_tables().collect();
    if failed.is_empty() {
        return;
    }
    let _ = writeln!(out, "## Failed tables");
    let _ = writeln!(out);
    for table in failed {
        let _ = writeln!(out, "### {} ({})", table.table_name, table.entity_type_name);
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{} violation(s) across {} validated row(s).",
            table.violation_count, table.validated_row_count
        );
        if table.violations.len() as u64 != table.violation_count {
            let _ = writeln!(
                out,
                "Showing the first {} sample(s); the JSON report carries up to {} per table.",
                table.violations.len().min(FAILED_TABLE_SAMPLE),
                datacert_model::VIOLATION_SAMPLE_CAP
            );
        }
        let _ = writeln!(out);
        for violation in table.violations.iter().take(FAILED_TABLE_SAMPLE) {
            let field = violation
                .field_name
                .as_deref()
                .map(|name| format!(", field {name}"))
                .unwrap_or_default();
            let observed = violation
                .observed_value
                .as_deref()
                .map(|value| format!(" (observed: {value})"))
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "- row {}{field} [{}]: {}{observed}",
                violation.record_index, violation.category, violation.message
            );
        }
        let _ = writeln!(out);
    }
}

/// Foreign-key constraints skipped for lack of an identifier index are a
/// documented limitation, not a silent pass: list them whatever the table's
/// status.
fn unchecked_fk_section(out: &mut String, report: &ValidationReport) {
    let affected: Vec<&TableResult> = report
        .tables
        .iter()
        .filter(|table| !table.fk_unchecked_fields.is_empty())
        .collect();
    if affected.is_empty() {
        return;
    }
    let _ = writeln!(out, "## Foreign-key checks skipped");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "No identifier index covered the targets of these constraints; the fields were \
         not validated against their referenced tables."
    );
    let _ = writeln!(out);
    for table in affected {
        let _ = writeln!(
            out,
            "- {}: {}",
            table.table_name,
            table.fk_unchecked_fields.join(", ")
        );
    }
    let _ = writeln!(out);
}

fn passed_tables_section(out: &mut String, report: &ValidationReport) {
    let passed: Vec<&TableResult> = report.passed_tables().collect();
    if passed.is_empty() {
        return;
    }
    let _ = writeln!(out, "## Passed tables");
    let _ = writeln!(out);
    for table in passed {
        let _ = writeln!(
            out,
            "- {} ({}, {} row(s) validated)",
            table.table_name, table.entity_type_name, table.validated_row_count
        );
    }
    let _ = writeln!(out);
}

fn results_table_section(out: &mut String, report: &ValidationReport) {
    let _ = writeln!(out, "## Results by table");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "| Table | Entity type | Status | Scan | Validated rows | Total rows | Violations | Elapsed (ms) |"
    );
    let _ = writeln!(out, "| --- | --- | --- | --- | ---: | ---: | ---: | ---: |");
    for table in &report.tables {
        let scan = if table.sampled { "sampled" } else { "full" };
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} | {} | {} |",
            table.table_name,
            table.entity_type_name,
            table.status.as_str(),
            scan,
            table.validated_row_count,
            table.total_row_count,
            table.violation_count,
            table.elapsed_ms
        );
    }
    let _ = writeln!(out);
}

fn recommendations_section(out: &mut String, report: &ValidationReport) {
    let _ = writeln!(out, "## Recommendations");
    let _ = writeln!(out);
    let mut any = false;
    for category in ViolationCategory::ALL {
        let count = report.histogram.get(&category).copied().unwrap_or(0);
        if count == 0 {
            continue;
        }
        any = true;
        let _ = writeln!(out, "- **{category}**: {}", remediation(category));
    }
    if !any {
        let _ = writeln!(out, "No remediation required; every validated table passed.");
    }
    let _ = writeln!(out);
}

fn remediation(category: ViolationCategory) -> &'static str {
    match category {
        ViolationCategory::SchemaMismatch => {
            "Undeclared fields were found in the data. Align the export pipeline with the \
             entity schema, or declare the new fields before re-certifying."
        }
        ViolationCategory::TypeViolation => {
            "Values disagree with their declared types. Check upstream type conversions and \
             column mappings for the affected fields."
        }
        ViolationCategory::MissingRequired => {
            "Required fields are empty. Verify that the source extraction populates every \
             mandatory field and that no column was dropped en route."
        }
        ViolationCategory::PatternViolation => {
            "String values fail their declared patterns. Review formatting rules (identifiers, \
             codes) applied by the producing system."
        }
        ViolationCategory::RangeViolation => {
            "Numeric values fall outside their declared bounds. Confirm the bounds are current \
             and investigate out-of-range measurements upstream."
        }
        ViolationCategory::EnumViolation => {
            "Values fall outside the permitted value sets. Reconcile the producing system's \
             vocabularies with the schema's allowed values."
        }
        ViolationCategory::ForeignKeyViolation => {
            "References point at identifiers that do not exist in the referenced tables. Check \
             export ordering and completeness of the referenced datasets."
        }
        ViolationCategory::NullValue => {
            "Identifier or sequence positions carry nulls. Ensure key fields and multivalued \
             sequences are fully populated before export."
        }
        ViolationCategory::Other => {
            "Operational errors or uncategorized failures occurred. Inspect the raw violation \
             messages in the JSON report for details."
        }
    }
}
