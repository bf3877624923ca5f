use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Declared field type in an entity schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclaredType {
    Integer,
    Float,
    String,
    Boolean,
    Datetime,
    Date,
}

impl DeclaredType {
    pub fn is_numeric(self) -> bool {
        matches!(self, DeclaredType::Integer | DeclaredType::Float)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeclaredType::Integer => "integer",
            DeclaredType::Float => "float",
            DeclaredType::String => "string",
            DeclaredType::Boolean => "boolean",
            DeclaredType::Datetime => "datetime",
            DeclaredType::Date => "date",
        }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Constraint set for one field of an entity type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldConstraint {
    pub name: String,
    #[serde(rename = "type")]
    pub declared_type: DeclaredType,
    #[serde(default)]
    pub required: bool,
    /// At most one identifier field per entity type.
    #[serde(default)]
    pub is_identifier: bool,
    #[serde(default)]
    pub is_unique_key: bool,
    /// Reference in `EntityType.field` form.
    #[serde(default)]
    pub foreign_key_target: Option<String>,
    /// Regular expression, string-typed fields only.
    #[serde(default)]
    pub pattern: Option<String>,
    /// Lower bound, numeric fields only.
    #[serde(default)]
    pub min_value: Option<f64>,
    /// Upper bound, numeric fields only.
    #[serde(default)]
    pub max_value: Option<f64>,
    /// Field holds an ordered sequence of scalars rather than one scalar.
    #[serde(default)]
    pub multivalued: bool,
    /// Closed set of permitted values.
    #[serde(default)]
    pub allowed_values: Option<Vec<String>>,
}

impl FieldConstraint {
    /// Split the foreign-key target into its `(entity_type, field)` halves.
    pub fn foreign_key(&self) -> Option<(&str, &str)> {
        self.foreign_key_target
            .as_deref()
            .and_then(|target| target.split_once('.'))
    }
}

/// A named schema class: ordered set of field constraints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityType {
    pub name: String,
    pub fields: Vec<FieldConstraint>,
}

impl EntityType {
    pub fn field(&self, name: &str) -> Option<&FieldConstraint> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn identifier(&self) -> Option<&FieldConstraint> {
        self.fields.iter().find(|field| field.is_identifier)
    }

    /// Unique-key fields in declared order.
    pub fn unique_keys(&self) -> impl Iterator<Item = &FieldConstraint> {
        self.fields.iter().filter(|field| field.is_unique_key)
    }
}

/// Immutable, process-wide read-only schema model.
///
/// Loaded once per run by `datacert-schema` and shared across table workers
/// behind an `Arc`; no mutation API is exposed after construction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaModel {
    entity_types: BTreeMap<String, EntityType>,
}

impl SchemaModel {
    /// Build a model from pre-validated entity types.
    ///
    /// Structural validation (name uniqueness, FK resolution, pattern
    /// compilation) is the loader's job; the model only stores.
    pub fn new(entity_types: Vec<EntityType>) -> Self {
        Self {
            entity_types: entity_types
                .into_iter()
                .map(|entity| (entity.name.clone(), entity))
                .collect(),
        }
    }

    pub fn entity_type(&self, name: &str) -> Result<&EntityType> {
        self.entity_types
            .get(name)
            .ok_or_else(|| ModelError::UnknownEntityType(name.to_string()))
    }

    /// Field constraints of an entity type, in schema-declared order.
    pub fn field_constraints(&self, entity_type_name: &str) -> Result<&[FieldConstraint]> {
        Ok(&self.entity_type(entity_type_name)?.fields)
    }

    pub fn entity_types(&self) -> impl Iterator<Item = &EntityType> {
        self.entity_types.values()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entity_types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entity_types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entity_types.is_empty()
    }
}
