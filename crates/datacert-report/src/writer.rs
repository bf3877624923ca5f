//! Timestamped report files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use datacert_model::ValidationReport;

use crate::json::to_json;
use crate::markdown::to_markdown;

/// Paths of the two report documents written for one run.
#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub markdown: PathBuf,
    pub json: PathBuf,
}

/// Write the Markdown and JSON reports into `output_dir`, named with the run
/// timestamp for auditability.
pub fn write_reports(
    report: &ValidationReport,
    output_dir: &Path,
    run_timestamp: DateTime<Utc>,
) -> Result<ReportPaths> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("create output dir: {}", output_dir.display()))?;

    let stamp = run_timestamp.format("%Y%m%dT%H%M%SZ");
    let generated_at = run_timestamp.to_rfc3339();

    let markdown_path = output_dir.join(format!("validation_{stamp}.md"));
    let json_path = output_dir.join(format!("validation_{stamp}.json"));

    std::fs::write(&markdown_path, to_markdown(report, &generated_at))
        .with_context(|| format!("write report: {}", markdown_path.display()))?;
    std::fs::write(&json_path, to_json(report, &generated_at)?)
        .with_context(|| format!("write report: {}", json_path.display()))?;

    Ok(ReportPaths {
        markdown: markdown_path,
        json: json_path,
    })
}
