//! Machine-readable report emission.

use anyhow::Result;
use serde::Serialize;

use datacert_model::ValidationReport;

pub const REPORT_SCHEMA: &str = "datacert.validation-report";
pub const REPORT_SCHEMA_VERSION: u32 = 1;

/// Versioned envelope around the lossless report serialization.
#[derive(Debug, Serialize)]
pub struct ReportPayload<'a> {
    pub schema: &'static str,
    pub schema_version: u32,
    pub generated_at: &'a str,
    pub report: &'a ValidationReport,
}

/// Render the report as JSON. Pure function of its inputs; the timestamp is
/// injected by the caller so repeated runs differ only in that field.
pub fn to_json(report: &ValidationReport, generated_at: &str) -> Result<String> {
    let payload = ReportPayload {
        schema: REPORT_SCHEMA,
        schema_version: REPORT_SCHEMA_VERSION,
        generated_at,
        report,
    };
    let json = serde_json::to_string_pretty(&payload)?;
    Ok(format!("{json}\n"))
}
