use std::collections::{BTreeMap, BTreeSet};

/// Cross-table identifier index: `(entity_type, field)` -> known identifier
/// values. Supplied by the caller to enable foreign-key checks; its absence
/// is not an error, it merely disables that one checking rule.
#[derive(Debug, Clone, Default)]
pub struct IdentifierIndex {
    entries: BTreeMap<(String, String), BTreeSet<String>>,
}

impl IdentifierIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        entity_type: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.entries
            .entry((entity_type.into(), field.into()))
            .or_default()
            .insert(value.into());
    }

    /// True when the index carries any values for the target.
    pub fn covers(&self, entity_type: &str, field: &str) -> bool {
        self.entries
            .contains_key(&(entity_type.to_string(), field.to_string()))
    }

    pub fn contains(&self, entity_type: &str, field: &str, value: &str) -> bool {
        self.entries
            .get(&(entity_type.to_string(), field.to_string()))
            .is_some_and(|values| values.contains(value))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
