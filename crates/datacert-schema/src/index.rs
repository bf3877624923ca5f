//! Identifier-index ingestion.
//!
//! Operators may supply a CSV of known identifier values
//! (`entity_type,field,value` with a header row) to enable foreign-key
//! checking. The file is optional; without it FK constraints are reported
//! as unchecked rather than validated.

use std::path::Path;

use datacert_model::IdentifierIndex;

use crate::error::{Result, SchemaError};

pub fn load_identifier_index(path: &Path) -> Result<IdentifierIndex> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_path(path)
        .map_err(|error| SchemaError::Csv {
            path: path.to_path_buf(),
            message: error.to_string(),
        })?;

    let mut index = IdentifierIndex::new();
    for record in reader.records() {
        let record = record.map_err(|error| SchemaError::Csv {
            path: path.to_path_buf(),
            message: error.to_string(),
        })?;
        let entity_type = record.get(0).unwrap_or("").trim();
        let field = record.get(1).unwrap_or("").trim();
        let value = record.get(2).unwrap_or("").trim();
        if entity_type.is_empty() || field.is_empty() || value.is_empty() {
            continue;
        }
        index.insert(entity_type, field, value);
    }
    Ok(index)
}
