pub mod error;
pub mod index;
pub mod result;
pub mod schema;
pub mod value;
pub mod violation;

pub use error::{ModelError, Result};
pub use index::IdentifierIndex;
pub use result::{
    ReportSummary, TableDescriptor, TableResult, TableStatus, VIOLATION_SAMPLE_CAP,
    ValidationReport,
};
pub use schema::{DeclaredType, EntityType, FieldConstraint, SchemaModel};
pub use value::{Record, RecordBatch, Value, format_numeric, parse_f64, parse_i64};
pub use violation::{
    OBSERVED_VALUE_MAX_LEN, Violation, ViolationCategory, truncate_observed,
};
