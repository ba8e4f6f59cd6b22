use thiserror::Error;

use crate::models::Dtype;
use crate::request::FetchError;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: String, got: String },

    #[error("Unsupported dtype `{0}`: could not determine classification or regression from `y`")]
    UnsupportedDtype(Dtype),

    #[error("Archive unreadable at {path}: {source}")]
    ArchiveUnreadable {
        path: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Entry not found in archive: {0}")]
    EntryNotFound(String),

    #[error("Fold {requested} does not exist (archive has {available} folds)")]
    FoldNotFound { requested: usize, available: usize },

    #[error("Entry {path} could not be read as UTF-8 text: {source}")]
    InvalidEntry {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DatasetError>;
