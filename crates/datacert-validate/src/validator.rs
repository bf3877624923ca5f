//! Per-record constraint checking.
//!
//! Each check emits a typed category at the point of detection; nothing
//! downstream re-derives categories from message text. Checks run per field
//! constraint in schema-declared order, so message ordering is stable.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;

use datacert_model::{
    DeclaredType, EntityType, FieldConstraint, IdentifierIndex, Record, SchemaModel, Value,
    Violation, ViolationCategory,
};

#[derive(Debug, thiserror::Error)]
pub enum ValidatorError {
    #[error("invalid pattern on {entity}.{field}: {source}")]
    InvalidPattern {
        entity: String,
        field: String,
        #[source]
        source: regex::Error,
    },
}

/// Validates one record at a time against an entity type's constraints.
///
/// Patterns are compiled once at construction. The validator is immutable
/// and shared across table workers; `validate` has no side effects and never
/// mutates the record.
pub struct RecordValidator {
    schema: Arc<SchemaModel>,
    /// Compiled patterns per entity type, aligned to field order.
    patterns: BTreeMap<String, Vec<Option<Regex>>>,
    index: Option<IdentifierIndex>,
}

impl RecordValidator {
    pub fn new(schema: Arc<SchemaModel>) -> Result<Self, ValidatorError> {
        let mut patterns = BTreeMap::new();
        for entity in schema.entity_types() {
            let mut compiled = Vec::with_capacity(entity.fields.len());
            for field in &entity.fields {
                match field.pattern.as_deref() {
                    Some(pattern) => {
                        let regex =
                            Regex::new(pattern).map_err(|source| ValidatorError::InvalidPattern {
                                entity: entity.name.clone(),
                                field: field.name.clone(),
                                source,
                            })?;
                        compiled.push(Some(regex));
                    }
                    None => compiled.push(None),
                }
            }
            patterns.insert(entity.name.clone(), compiled);
        }
        Ok(Self {
            schema,
            patterns,
            index: None,
        })
    }

    /// Enable foreign-key checks against a caller-supplied identifier index.
    pub fn with_identifier_index(mut self, index: IdentifierIndex) -> Self {
        self.index = Some(index);
        self
    }

    pub fn schema(&self) -> &Arc<SchemaModel> {
        &self.schema
    }

    /// Foreign-key fields of `entity` whose targets the identifier index
    /// does not cover. These constraints are skipped, and the skip is
    /// surfaced per table rather than silently passed.
    pub fn unchecked_foreign_keys(&self, entity: &EntityType) -> Vec<String> {
        entity
            .fields
            .iter()
            .filter_map(|field| {
                let (target_entity, target_field) = field.foreign_key()?;
                let covered = self
                    .index
                    .as_ref()
                    .is_some_and(|index| index.covers(target_entity, target_field));
                if covered {
                    None
                } else {
                    Some(field.name.clone())
                }
            })
            .collect()
    }

    /// Check one record against one entity type, returning every violation.
    pub fn validate(&self, record: &Record, entity: &EntityType) -> Vec<Violation> {
        let mut violations = Vec::new();

        for (field_index, field) in entity.fields.iter().enumerate() {
            self.check_field(record, entity, field_index, field, &mut violations);
        }

        // One schema_mismatch per unexpected field, never per record.
        for name in record.field_names() {
            if entity.field(name).is_none() {
                violations.push(Violation::field(
                    record.row_index,
                    name,
                    ViolationCategory::SchemaMismatch,
                    format!(
                        "field {name} is not declared on entity type {}",
                        entity.name
                    ),
                ));
            }
        }

        violations
    }

    fn check_field(
        &self,
        record: &Record,
        entity: &EntityType,
        field_index: usize,
        field: &FieldConstraint,
        violations: &mut Vec<Violation>,
    ) {
        let value = record.get(&field.name);
        let is_missing = value.is_none_or(Value::is_null);

        if is_missing {
            if field.required {
                violations.push(Violation::field(
                    record.row_index,
                    field.name.as_str(),
                    ViolationCategory::MissingRequired,
                    format!("required field {} is missing", field.name),
                ));
            } else if field.is_identifier || field.is_unique_key {
                violations.push(Violation::field(
                    record.row_index,
                    field.name.as_str(),
                    ViolationCategory::NullValue,
                    format!(
                        "null value in {} field {}",
                        if field.is_identifier {
                            "identifier"
                        } else {
                            "unique-key"
                        },
                        field.name
                    ),
                ));
            }
            return;
        }
        let value = value.expect("present value");

        if field.multivalued {
            // A scalar on a multivalued field reads as a one-element sequence.
            match value {
                Value::List(items) => {
                    for (position, item) in items.iter().enumerate() {
                        if item.is_null() {
                            violations.push(Violation::field(
                                record.row_index,
                                field.name.as_str(),
                                ViolationCategory::NullValue,
                                format!(
                                    "null element at position {position} in multivalued field {}",
                                    field.name
                                ),
                            ));
                        } else {
                            self.check_scalar(
                                record,
                                entity,
                                field_index,
                                field,
                                item,
                                Some(position),
                                violations,
                            );
                        }
                    }
                }
                scalar => {
                    self.check_scalar(record, entity, field_index, field, scalar, None, violations);
                }
            }
            return;
        }

        if matches!(value, Value::List(_)) {
            violations.push(
                Violation::field(
                    record.row_index,
                    field.name.as_str(),
                    ViolationCategory::TypeViolation,
                    format!("sequence value where scalar {} expected in field {}",
                        field.declared_type, field.name),
                )
                .with_observed(&value.to_string()),
            );
            return;
        }
        self.check_scalar(record, entity, field_index, field, value, None, violations);
    }

    #[allow(clippy::too_many_arguments)]
    fn check_scalar(
        &self,
        record: &Record,
        entity: &EntityType,
        field_index: usize,
        field: &FieldConstraint,
        value: &Value,
        element: Option<usize>,
        violations: &mut Vec<Violation>,
    ) {
        let locus = match element {
            Some(position) => format!("element {position} of field {}", field.name),
            None => format!("field {}", field.name),
        };

        if !type_matches(field.declared_type, value) {
            violations.push(
                Violation::field(
                    record.row_index,
                    field.name.as_str(),
                    ViolationCategory::TypeViolation,
                    format!("expected {} in {locus}", field.declared_type),
                )
                .with_observed(&value.to_string()),
            );
            // The remaining checks assume a well-typed value.
            return;
        }

        let pattern = self
            .patterns
            .get(&entity.name)
            .and_then(|compiled| compiled.get(field_index))
            .and_then(Option::as_ref);
        if let Some(regex) = pattern
            && let Some(text) = value.as_str()
            && !regex.is_match(text)
        {
            violations.push(
                Violation::field(
                    record.row_index,
                    field.name.as_str(),
                    ViolationCategory::PatternViolation,
                    format!(
                        "value does not match pattern {} in {locus}",
                        field.pattern.as_deref().unwrap_or_default()
                    ),
                )
                .with_observed(text),
            );
        }

        if field.declared_type.is_numeric()
            && (field.min_value.is_some() || field.max_value.is_some())
            && let Some(number) = value.as_f64()
        {
            let below = field.min_value.is_some_and(|min| number < min);
            let above = field.max_value.is_some_and(|max| number > max);
            if below || above {
                violations.push(
                    Violation::field(
                        record.row_index,
                        field.name.as_str(),
                        ViolationCategory::RangeViolation,
                        format!(
                            "value outside {} in {locus}",
                            bounds_text(field.min_value, field.max_value)
                        ),
                    )
                    .with_observed(&value.to_string()),
                );
            }
        }

        if let Some(allowed) = field.allowed_values.as_ref() {
            let rendered = value.to_string();
            if !allowed.iter().any(|candidate| candidate == &rendered) {
                violations.push(
                    Violation::field(
                        record.row_index,
                        field.name.as_str(),
                        ViolationCategory::EnumViolation,
                        format!("value not in the permitted set for {locus}"),
                    )
                    .with_observed(&rendered),
                );
            }
        }

        if let Some((target_entity, target_field)) = field.foreign_key()
            && let Some(index) = self.index.as_ref()
            && index.covers(target_entity, target_field)
        {
            let rendered = value.to_string();
            if !index.contains(target_entity, target_field, &rendered) {
                violations.push(
                    Violation::field(
                        record.row_index,
                        field.name.as_str(),
                        ViolationCategory::ForeignKeyViolation,
                        format!(
                            "value not found among {target_entity}.{target_field} identifiers ({locus})"
                        ),
                    )
                    .with_observed(&rendered),
                );
            }
        }
    }
}

fn bounds_text(min: Option<f64>, max: Option<f64>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("range [{min}, {max}]"),
        (Some(min), None) => format!("minimum {min}"),
        (None, Some(max)) => format!("maximum {max}"),
        (None, None) => "range".to_string(),
    }
}

/// Runtime shape check with coercion: numeric strings are accepted for
/// numeric fields, integral floats for integer fields, and common literal
/// forms for booleans. Any scalar renders as a string.
fn type_matches(declared: DeclaredType, value: &Value) -> bool {
    match declared {
        DeclaredType::Integer => value.as_i64().is_some(),
        DeclaredType::Float => value.as_f64().is_some(),
        DeclaredType::String => !matches!(value, Value::List(_)),
        DeclaredType::Boolean => match value {
            Value::Bool(_) => true,
            Value::Int(v) => *v == 0 || *v == 1,
            Value::Str(s) => {
                let lowered = s.trim().to_lowercase();
                matches!(lowered.as_str(), "true" | "false" | "0" | "1")
            }
            _ => false,
        },
        DeclaredType::Datetime => match value {
            Value::Str(s) => is_datetime(s.trim()),
            _ => false,
        },
        DeclaredType::Date => match value {
            Value::Str(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").is_ok(),
            _ => false,
        },
    }
}

fn is_datetime(text: &str) -> bool {
    if DateTime::parse_from_rfc3339(text).is_ok() {
        return true;
    }
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
    ];
    if FORMATS
        .iter()
        .any(|format| NaiveDateTime::parse_from_str(text, format).is_ok())
    {
        return true;
    }
    // Exports commonly carry bare dates in datetime columns.
    NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok()
}
