use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("table not found: {table}")]
    TableNotFound { table: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to scan {path}: {message}")]
    Scan { path: PathBuf, message: String },
}

impl StoreError {
    pub(crate) fn scan(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Scan {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
