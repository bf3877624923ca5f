//! End-to-end validation run, wired together for the CLI.
//!
//! Stages in order:
//! 1. **Load**: schema document (hard stop on failure), run configuration,
//!    optional identifier index
//! 2. **Validate**: parallel per-table workers via the engine runner
//! 3. **Report**: timestamped Markdown + JSON files (skipped on dry runs)

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;

use datacert_engine::{CancelToken, RunOptions, Runner};
use datacert_model::ValidationReport;
use datacert_report::{ReportPaths, write_reports};
use datacert_schema::{RunConfig, load_identifier_index, load_schema};
use datacert_store::{CsvStore, TableStore};
use datacert_validate::RecordValidator;

/// Everything a validation run needs, independent of the CLI surface.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub schema: PathBuf,
    pub config: PathBuf,
    pub data_dir: PathBuf,
    /// Defaults to `<data_dir>/reports`.
    pub output_dir: Option<PathBuf>,
    pub identifier_index: Option<PathBuf>,
    pub exhaustive: bool,
    /// 0 uses available parallelism.
    pub workers: usize,
    pub sample_cap: Option<u64>,
    pub chunk_size: Option<u64>,
    pub dry_run: bool,
}

#[derive(Debug)]
pub struct RunOutcome {
    pub report: ValidationReport,
    /// Absent on dry runs.
    pub paths: Option<ReportPaths>,
}

pub fn run_validation(request: &RunRequest, cancel: &CancelToken) -> Result<RunOutcome> {
    // A schema-load failure is a hard stop: no tables, no partial report.
    let loaded = load_schema(&request.schema)
        .with_context(|| format!("load schema: {}", request.schema.display()))?;
    info!(
        entity_types = loaded.model.len(),
        fingerprint = %loaded.fingerprint,
        "schema loaded"
    );

    let mut config = RunConfig::load(&request.config)
        .with_context(|| format!("load configuration: {}", request.config.display()))?;
    config.validate_against(&loaded.model)?;
    if let Some(cap) = request.sample_cap {
        config.budget.sample_cap = cap;
    }
    if let Some(size) = request.chunk_size {
        config.budget.chunk_size = size;
    }

    let mut validator = RecordValidator::new(Arc::new(loaded.model))?;
    if let Some(path) = &request.identifier_index {
        let index = load_identifier_index(path)
            .with_context(|| format!("load identifier index: {}", path.display()))?;
        info!(targets = index.len(), "identifier index loaded");
        validator = validator.with_identifier_index(index);
    }

    let store: Arc<dyn TableStore> = Arc::new(CsvStore::new(&request.data_dir));
    let runner = Runner::new(
        Arc::new(validator),
        store,
        config,
        RunOptions {
            exhaustive: request.exhaustive,
            workers: request.workers,
        },
        loaded.fingerprint.as_str(),
    );
    let report = runner.run(cancel);

    let paths = if request.dry_run {
        None
    } else {
        let output_dir = request
            .output_dir
            .clone()
            .unwrap_or_else(|| request.data_dir.join("reports"));
        let paths = write_reports(&report, &output_dir, Utc::now())?;
        info!(
            markdown = %paths.markdown.display(),
            json = %paths.json.display(),
            "reports written"
        );
        Some(paths)
    };

    Ok(RunOutcome { report, paths })
}
