//! Declarative schema loading.
//!
//! The schema document is JSON: a list of entity types, each with an ordered
//! list of field constraints. The loader performs all structural validation
//! up front so the rest of the pipeline can treat the model as well-formed:
//! name uniqueness, at most one identifier per entity type, patterns compile
//! and sit on string fields, numeric bounds sit on numeric fields, and every
//! foreign-key target resolves to a declared `EntityType.field`.

use std::collections::BTreeSet;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use datacert_model::{EntityType, SchemaModel};

use crate::error::{Result, SchemaError};
use crate::hash::sha256_hex;

#[derive(Debug, Deserialize)]
struct SchemaDocument {
    entity_types: Vec<EntityType>,
}

/// A schema model together with the fingerprint of the document it was
/// loaded from.
#[derive(Debug, Clone)]
pub struct LoadedSchema {
    pub model: SchemaModel,
    pub fingerprint: String,
}

/// Load and validate a schema document. Called exactly once per run.
pub fn load_schema(path: &Path) -> Result<LoadedSchema> {
    let bytes = std::fs::read(path).map_err(|source| SchemaError::io(path, source))?;
    let fingerprint = sha256_hex(&bytes);
    let model = parse_schema(&bytes, path)?;
    Ok(LoadedSchema { model, fingerprint })
}

/// Parse and validate raw schema bytes. `path` is used for error context only.
pub fn parse_schema(bytes: &[u8], path: &Path) -> Result<SchemaModel> {
    let document: SchemaDocument =
        serde_json::from_slice(bytes).map_err(|source| SchemaError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    validate_entity_types(&document.entity_types)?;
    Ok(SchemaModel::new(document.entity_types))
}

fn validate_entity_types(entity_types: &[EntityType]) -> Result<()> {
    if entity_types.is_empty() {
        return Err(SchemaError::Empty);
    }

    let mut names = BTreeSet::new();
    for entity in entity_types {
        if !names.insert(entity.name.as_str()) {
            return Err(SchemaError::DuplicateEntityType {
                name: entity.name.clone(),
            });
        }
        validate_fields(entity)?;
    }

    // Foreign-key targets resolve against the full set of declared types,
    // so this pass runs after every entity has been seen.
    for entity in entity_types {
        for field in &entity.fields {
            let Some(target) = field.foreign_key_target.as_deref() else {
                continue;
            };
            let Some((target_entity, target_field)) = field.foreign_key() else {
                return Err(SchemaError::MalformedForeignKeyTarget {
                    entity: entity.name.clone(),
                    field: field.name.clone(),
                    target: target.to_string(),
                });
            };
            let resolved = entity_types
                .iter()
                .find(|candidate| candidate.name == target_entity)
                .and_then(|candidate| candidate.field(target_field));
            if resolved.is_none() {
                return Err(SchemaError::UnknownForeignKeyTarget {
                    entity: entity.name.clone(),
                    field: field.name.clone(),
                    target: target.to_string(),
                });
            }
        }
    }

    Ok(())
}

fn validate_fields(entity: &EntityType) -> Result<()> {
    let mut names = BTreeSet::new();
    let mut identifier: Option<&str> = None;

    for field in &entity.fields {
        if !names.insert(field.name.as_str()) {
            return Err(SchemaError::DuplicateField {
                entity: entity.name.clone(),
                field: field.name.clone(),
            });
        }

        if field.is_identifier {
            if let Some(first) = identifier {
                return Err(SchemaError::MultipleIdentifiers {
                    entity: entity.name.clone(),
                    first: first.to_string(),
                    second: field.name.clone(),
                });
            }
            identifier = Some(&field.name);
        }

        if let Some(pattern) = field.pattern.as_deref() {
            if field.declared_type != datacert_model::DeclaredType::String {
                return Err(SchemaError::PatternOnNonString {
                    entity: entity.name.clone(),
                    field: field.name.clone(),
                });
            }
            if let Err(error) = Regex::new(pattern) {
                return Err(SchemaError::InvalidPattern {
                    entity: entity.name.clone(),
                    field: field.name.clone(),
                    message: error.to_string(),
                });
            }
        }

        if (field.min_value.is_some() || field.max_value.is_some())
            && !field.declared_type.is_numeric()
        {
            return Err(SchemaError::BoundsOnNonNumeric {
                entity: entity.name.clone(),
                field: field.name.clone(),
            });
        }
        if let (Some(min), Some(max)) = (field.min_value, field.max_value)
            && min > max
        {
            return Err(SchemaError::EmptyBounds {
                entity: entity.name.clone(),
                field: field.name.clone(),
                min,
                max,
            });
        }

        if let Some(values) = field.allowed_values.as_ref()
            && values.is_empty()
        {
            return Err(SchemaError::EmptyAllowedValues {
                entity: entity.name.clone(),
                field: field.name.clone(),
            });
        }
    }

    Ok(())
}
