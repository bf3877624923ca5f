use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed violation taxonomy. Identifiers are stable; downstream automation
/// matches on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCategory {
    SchemaMismatch,
    TypeViolation,
    MissingRequired,
    PatternViolation,
    RangeViolation,
    EnumViolation,
    ForeignKeyViolation,
    NullValue,
    Other,
}

impl ViolationCategory {
    pub const ALL: [ViolationCategory; 9] = [
        ViolationCategory::SchemaMismatch,
        ViolationCategory::TypeViolation,
        ViolationCategory::MissingRequired,
        ViolationCategory::PatternViolation,
        ViolationCategory::RangeViolation,
        ViolationCategory::EnumViolation,
        ViolationCategory::ForeignKeyViolation,
        ViolationCategory::NullValue,
        ViolationCategory::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ViolationCategory::SchemaMismatch => "schema_mismatch",
            ViolationCategory::TypeViolation => "type_violation",
            ViolationCategory::MissingRequired => "missing_required",
            ViolationCategory::PatternViolation => "pattern_violation",
            ViolationCategory::RangeViolation => "range_violation",
            ViolationCategory::EnumViolation => "enum_violation",
            ViolationCategory::ForeignKeyViolation => "foreign_key_violation",
            ViolationCategory::NullValue => "null_value",
            ViolationCategory::Other => "other",
        }
    }
}

impl fmt::Display for ViolationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Display cap for observed values carried in violations.
pub const OBSERVED_VALUE_MAX_LEN: usize = 64;

/// Truncate an observed value for display, marking the cut.
pub fn truncate_observed(value: &str) -> String {
    if value.chars().count() <= OBSERVED_VALUE_MAX_LEN {
        return value.to_string();
    }
    let head: String = value.chars().take(OBSERVED_VALUE_MAX_LEN).collect();
    format!("{head}…")
}

/// One constraint failure.
///
/// The category is produced at the point of detection, never re-derived
/// from the message text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Position within the table, not the batch.
    pub record_index: u64,
    /// Absent for whole-record issues such as unexpected extra fields.
    pub field_name: Option<String>,
    pub category: ViolationCategory,
    pub message: String,
    pub observed_value: Option<String>,
}

impl Violation {
    pub fn field(
        record_index: u64,
        field_name: impl Into<String>,
        category: ViolationCategory,
        message: impl Into<String>,
    ) -> Self {
        Self {
            record_index,
            field_name: Some(field_name.into()),
            category,
            message: message.into(),
            observed_value: None,
        }
    }

    pub fn record(record_index: u64, category: ViolationCategory, message: impl Into<String>) -> Self {
        Self {
            record_index,
            field_name: None,
            category,
            message: message.into(),
            observed_value: None,
        }
    }

    pub fn with_observed(mut self, value: &str) -> Self {
        self.observed_value = Some(truncate_observed(value));
        self
    }
}
