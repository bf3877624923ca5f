use std::io::Write;
use std::path::Path;

use datacert_schema::{SchemaError, load_schema, parse_schema};

fn parse(json: &str) -> Result<datacert_model::SchemaModel, SchemaError> {
    parse_schema(json.as_bytes(), Path::new("schema.json"))
}

const VALID_SCHEMA: &str = r#"{
    "entity_types": [
        {
            "name": "Study",
            "fields": [
                {"name": "id", "type": "string", "required": true, "is_identifier": true}
            ]
        },
        {
            "name": "Patient",
            "fields": [
                {"name": "id", "type": "string", "required": true, "is_identifier": true,
                 "pattern": "^P[0-9]+$"},
                {"name": "study_id", "type": "string", "required": true,
                 "foreign_key_target": "Study.id"},
                {"name": "age", "type": "integer", "min_value": 0, "max_value": 150}
            ]
        }
    ]
}"#;

#[test]
fn valid_schema_loads() {
    let model = parse(VALID_SCHEMA).expect("valid schema");
    assert_eq!(model.len(), 2);
    let patient = model.entity_type("Patient").expect("Patient declared");
    assert_eq!(patient.fields.len(), 3);
    assert_eq!(
        patient.field("study_id").unwrap().foreign_key(),
        Some(("Study", "id"))
    );
}

#[test]
fn load_schema_reports_fingerprint() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(VALID_SCHEMA.as_bytes()).expect("write schema");
    let loaded = load_schema(file.path()).expect("load schema");
    assert_eq!(loaded.model.len(), 2);
    assert_eq!(loaded.fingerprint.len(), 64);
    assert!(loaded.fingerprint.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn malformed_document_is_rejected() {
    let error = parse("{ not json").unwrap_err();
    assert!(matches!(error, SchemaError::Json { .. }));
}

#[test]
fn empty_schema_is_rejected() {
    let error = parse(r#"{"entity_types": []}"#).unwrap_err();
    assert!(matches!(error, SchemaError::Empty));
}

#[test]
fn duplicate_field_is_rejected() {
    let error = parse(
        r#"{"entity_types": [{"name": "T", "fields": [
            {"name": "a", "type": "string"},
            {"name": "a", "type": "integer"}
        ]}]}"#,
    )
    .unwrap_err();
    assert!(matches!(error, SchemaError::DuplicateField { entity, field }
        if entity == "T" && field == "a"));
}

#[test]
fn second_identifier_is_rejected() {
    let error = parse(
        r#"{"entity_types": [{"name": "T", "fields": [
            {"name": "a", "type": "string", "is_identifier": true},
            {"name": "b", "type": "string", "is_identifier": true}
        ]}]}"#,
    )
    .unwrap_err();
    assert!(matches!(error, SchemaError::MultipleIdentifiers { .. }));
}

#[test]
fn unknown_foreign_key_target_is_rejected() {
    let error = parse(
        r#"{"entity_types": [{"name": "T", "fields": [
            {"name": "ref", "type": "string", "foreign_key_target": "Missing.id"}
        ]}]}"#,
    )
    .unwrap_err();
    assert!(matches!(error, SchemaError::UnknownForeignKeyTarget { target, .. }
        if target == "Missing.id"));
}

#[test]
fn malformed_foreign_key_target_is_rejected() {
    let error = parse(
        r#"{"entity_types": [{"name": "T", "fields": [
            {"name": "ref", "type": "string", "foreign_key_target": "no-dot"}
        ]}]}"#,
    )
    .unwrap_err();
    assert!(matches!(error, SchemaError::MalformedForeignKeyTarget { .. }));
}

#[test]
fn invalid_pattern_is_rejected() {
    let error = parse(
        r#"{"entity_types": [{"name": "T", "fields": [
            {"name": "a", "type": "string", "pattern": "(unclosed"}
        ]}]}"#,
    )
    .unwrap_err();
    assert!(matches!(error, SchemaError::InvalidPattern { .. }));
}

#[test]
fn pattern_on_numeric_field_is_rejected() {
    let error = parse(
        r#"{"entity_types": [{"name": "T", "fields": [
            {"name": "a", "type": "integer", "pattern": "^[0-9]+$"}
        ]}]}"#,
    )
    .unwrap_err();
    assert!(matches!(error, SchemaError::PatternOnNonString { .. }));
}

#[test]
fn bounds_on_string_field_are_rejected() {
    let error = parse(
        r#"{"entity_types": [{"name": "T", "fields": [
            {"name": "a", "type": "string", "min_value": 1.0}
        ]}]}"#,
    )
    .unwrap_err();
    assert!(matches!(error, SchemaError::BoundsOnNonNumeric { .. }));
}

#[test]
fn inverted_bounds_are_rejected() {
    let error = parse(
        r#"{"entity_types": [{"name": "T", "fields": [
            {"name": "a", "type": "float", "min_value": 10.0, "max_value": 1.0}
        ]}]}"#,
    )
    .unwrap_err();
    assert!(matches!(error, SchemaError::EmptyBounds { .. }));
}
