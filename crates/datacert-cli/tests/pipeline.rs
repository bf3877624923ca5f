//! End-to-end tests for the CLI pipeline over on-disk fixtures.

use std::fs;
use std::path::Path;

use datacert_cli::pipeline::{RunRequest, run_validation};
use datacert_engine::CancelToken;
use datacert_model::{TableStatus, ViolationCategory};

const SCHEMA: &str = r#"{
    "entity_types": [
        {
            "name": "Patient",
            "fields": [
                {"name": "id", "type": "string", "required": true, "is_identifier": true,
                 "pattern": "^P[0-9]+$"},
                {"name": "age", "type": "integer", "min_value": 0, "max_value": 150}
            ]
        },
        {
            "name": "Visit",
            "fields": [
                {"name": "id", "type": "integer", "required": true},
                {"name": "visit_date", "type": "date", "required": true}
            ]
        }
    ]
}"#;

const CONFIG: &str = r#"{
    "tables": {
        "patients": {"entity_type": "Patient"},
        "visits": {"entity_type": "Visit"}
    }
}"#;

fn write_fixtures(root: &Path) {
    fs::write(root.join("schema.json"), SCHEMA).expect("write schema");
    fs::write(root.join("config.json"), CONFIG).expect("write config");

    let data_dir = root.join("data");
    fs::create_dir(&data_dir).expect("create data dir");
    fs::write(
        data_dir.join("patients.csv"),
        "id,age\nP001,30\nP002,44\n",
    )
    .expect("write patients");

    // Partitioned table: one bad date in the first partition.
    let visits_dir = data_dir.join("visits");
    fs::create_dir(&visits_dir).expect("create visits dir");
    fs::write(
        visits_dir.join("part-1.csv"),
        "id,visit_date\n1,2024-01-01\n2,not-a-date\n",
    )
    .expect("write part-1");
    fs::write(
        visits_dir.join("part-2.csv"),
        "id,visit_date\n3,2024-02-02\n",
    )
    .expect("write part-2");
}

fn request_for(root: &Path, dry_run: bool) -> RunRequest {
    RunRequest {
        schema: root.join("schema.json"),
        config: root.join("config.json"),
        data_dir: root.join("data"),
        output_dir: Some(root.join("reports")),
        identifier_index: None,
        exhaustive: false,
        workers: 1,
        sample_cap: None,
        chunk_size: None,
        dry_run,
    }
}

#[test]
fn run_validates_tables_and_writes_reports() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_fixtures(dir.path());

    let outcome =
        run_validation(&request_for(dir.path(), false), &CancelToken::new()).expect("run");
    let report = &outcome.report;

    assert_eq!(report.tables.len(), 2);
    assert_eq!(report.schema_fingerprint.len(), 64);

    let patients = &report.tables[0];
    assert_eq!(patients.table_name, "patients");
    assert_eq!(patients.status, TableStatus::Passed);
    assert_eq!(patients.validated_row_count, 2);

    let visits = &report.tables[1];
    assert_eq!(visits.table_name, "visits");
    assert_eq!(visits.status, TableStatus::Failed);
    assert_eq!(visits.total_row_count, 3);
    assert_eq!(visits.validated_row_count, 3);
    assert_eq!(visits.violation_count, 1);
    assert_eq!(visits.violations[0].category, ViolationCategory::TypeViolation);
    assert_eq!(visits.violations[0].record_index, 1);
    assert_eq!(visits.violations[0].field_name.as_deref(), Some("visit_date"));

    assert!(!report.all_passed());
    assert_eq!(report.summary.rows_validated, 5);

    let paths = outcome.paths.expect("reports written");
    assert!(paths.markdown.exists());
    assert!(paths.json.exists());

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&paths.json).expect("read json"))
            .expect("parse json");
    assert_eq!(json["schema"], "datacert.validation-report");
    assert_eq!(json["report"]["summary"]["tables_failed"], 1);

    let markdown = fs::read_to_string(&paths.markdown).expect("read markdown");
    assert!(markdown.contains("### visits (Visit)"));
    assert!(markdown.contains("**type_violation**"));
}

#[test]
fn dry_run_skips_report_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_fixtures(dir.path());

    let outcome =
        run_validation(&request_for(dir.path(), true), &CancelToken::new()).expect("run");
    assert!(outcome.paths.is_none());
    assert!(!dir.path().join("reports").exists());
    assert_eq!(outcome.report.tables.len(), 2);
}

#[test]
fn schema_load_failure_is_a_hard_stop() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_fixtures(dir.path());
    fs::write(dir.path().join("schema.json"), "{ broken").expect("corrupt schema");

    let error =
        run_validation(&request_for(dir.path(), false), &CancelToken::new()).unwrap_err();
    assert!(error.to_string().contains("load schema"));
    // No partial report is written on a schema-load failure.
    assert!(!dir.path().join("reports").exists());
}

#[test]
fn unknown_mapped_entity_type_fails_before_validation() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_fixtures(dir.path());
    fs::write(
        dir.path().join("config.json"),
        r#"{"tables": {"patients": {"entity_type": "Ghost"}}}"#,
    )
    .expect("rewrite config");

    let error =
        run_validation(&request_for(dir.path(), false), &CancelToken::new()).unwrap_err();
    assert!(error.to_string().contains("Ghost"));
}
