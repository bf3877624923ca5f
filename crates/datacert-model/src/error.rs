use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown entity type: {0}")]
    UnknownEntityType(String),
    #[error("unknown table: {0}")]
    UnknownTable(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
