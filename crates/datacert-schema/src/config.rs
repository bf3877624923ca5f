//! Run configuration: the static table-to-entity-type mapping, per-table
//! plan overrides, and the default scan budget.
//!
//! The mapping is an explicit lookup table loaded from configuration, never
//! inferred from table names; an unmapped table is a typed error rather than
//! a silent default.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use datacert_model::{ModelError, SchemaModel, TableDescriptor};

use crate::error::{Result, SchemaError};

fn default_full_scan_threshold() -> u64 {
    100_000
}

fn default_sample_cap() -> u64 {
    50_000
}

fn default_chunk_size() -> u64 {
    10_000
}

/// Default per-table row cap and chunk size for scan planning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BudgetConfig {
    #[serde(default = "default_full_scan_threshold")]
    pub full_scan_threshold: u64,
    #[serde(default = "default_sample_cap")]
    pub sample_cap: u64,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u64,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            full_scan_threshold: default_full_scan_threshold(),
            sample_cap: default_sample_cap(),
            chunk_size: default_chunk_size(),
        }
    }
}

/// Forced scan mode for a single table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanModeOverride {
    /// Scan every row regardless of table size.
    Full,
    /// Sample even below the full-scan threshold; some tables are known to
    /// be expensive to scan fully regardless of row count.
    Sample,
}

/// Operator-supplied plan override for one table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanOverride {
    #[serde(default)]
    pub mode: Option<PlanModeOverride>,
    #[serde(default)]
    pub row_cap: Option<u64>,
    #[serde(default)]
    pub chunk_size: Option<u64>,
}

/// One table's configuration entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableBinding {
    pub entity_type: String,
    #[serde(default)]
    pub plan: Option<PlanOverride>,
}

/// Full run configuration document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub tables: BTreeMap<String, TableBinding>,
    #[serde(default)]
    pub budget: BudgetConfig,
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|source| SchemaError::io(path, source))?;
        let config: RunConfig =
            serde_json::from_slice(&bytes).map_err(|source| SchemaError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        if config.tables.is_empty() {
            return Err(SchemaError::NoTables);
        }
        Ok(config)
    }

    /// Fail fast when the mapping references entity types the schema does
    /// not declare.
    pub fn validate_against(&self, schema: &SchemaModel) -> Result<()> {
        for (table, binding) in &self.tables {
            if !schema.contains(&binding.entity_type) {
                return Err(SchemaError::UnknownMappedEntityType {
                    table: table.clone(),
                    entity: binding.entity_type.clone(),
                });
            }
        }
        Ok(())
    }

    /// Table descriptors in deterministic (name) order.
    pub fn descriptors(&self) -> Vec<TableDescriptor> {
        self.tables
            .iter()
            .map(|(table, binding)| TableDescriptor {
                table_name: table.clone(),
                entity_type_name: binding.entity_type.clone(),
            })
            .collect()
    }

    pub fn binding(&self, table: &str) -> std::result::Result<&TableBinding, ModelError> {
        self.tables
            .get(table)
            .ok_or_else(|| ModelError::UnknownTable(table.to_string()))
    }

    pub fn plan_override(&self, table: &str) -> Option<&PlanOverride> {
        self.tables.get(table).and_then(|binding| binding.plan.as_ref())
    }
}
