use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON document {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse CSV {path}: {message}")]
    Csv { path: PathBuf, message: String },

    #[error("schema declares no entity types")]
    Empty,

    #[error("duplicate entity type: {name}")]
    DuplicateEntityType { name: String },

    #[error("duplicate field {field} in entity type {entity}")]
    DuplicateField { entity: String, field: String },

    #[error("entity type {entity} declares more than one identifier field ({first}, {second})")]
    MultipleIdentifiers {
        entity: String,
        first: String,
        second: String,
    },

    #[error("pattern on non-string field {entity}.{field}")]
    PatternOnNonString { entity: String, field: String },

    #[error("invalid pattern on {entity}.{field}: {message}")]
    InvalidPattern {
        entity: String,
        field: String,
        message: String,
    },

    #[error("numeric bounds on non-numeric field {entity}.{field}")]
    BoundsOnNonNumeric { entity: String, field: String },

    #[error("empty bound interval on {entity}.{field}: min {min} exceeds max {max}")]
    EmptyBounds {
        entity: String,
        field: String,
        min: f64,
        max: f64,
    },

    #[error(
        "malformed foreign-key target \"{target}\" on {entity}.{field} (expected EntityType.field)"
    )]
    MalformedForeignKeyTarget {
        entity: String,
        field: String,
        target: String,
    },

    #[error("foreign-key target \"{target}\" on {entity}.{field} does not resolve")]
    UnknownForeignKeyTarget {
        entity: String,
        field: String,
        target: String,
    },

    #[error("empty allowed-values set on {entity}.{field}")]
    EmptyAllowedValues { entity: String, field: String },

    #[error("table {table} is mapped to unknown entity type {entity}")]
    UnknownMappedEntityType { table: String, entity: String },

    #[error("configuration maps no tables")]
    NoTables,
}

impl SchemaError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SchemaError>;
