//! Error type shared by every catalog operation.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog is missing at least one required column.
    #[error("the catalog is corrupted: missing required columns")]
    InvalidCatalog,

    #[error("the column '{0}' doesn't exist")]
    ColumnNotFound(String),

    #[error("invalid path: {}", .0.display())]
    InvalidPath(PathBuf),

    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("plist error: {0}")]
    Plist(#[from] plist::Error),

    #[error("snapshot encode error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("snapshot decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T, E = CatalogError> = std::result::Result<T, E>;

impl CatalogError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        CatalogError::MalformedInput(msg.into())
    }
}
