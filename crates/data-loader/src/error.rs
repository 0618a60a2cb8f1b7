//! Errors raised while reading a catalog snapshot.
//!
//! Parse failures carry the file and line so a broken export can be fixed at
//! the source. A ratings row pointing at an unknown movie is not an error
//! here; `DataIndex::validate` only warns about it.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataLoadError {
    /// A required snapshot file (genres, movies or ratings) is absent
    #[error("Snapshot file missing: {path}")]
    FileNotFound { path: String },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("{file}:{line}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A field parsed but is out of range, e.g. a rating of 11
    #[error("Invalid {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Line {line}: expected {expected} `::`-separated fields, found {found}")]
    FieldCountMismatch {
        expected: usize,
        found: usize,
        line: usize,
    },

    /// similarity.json is malformed
    #[error("Similarity artifact error: {0}")]
    Json(#[from] serde_json::Error),

    /// The artifact or the catalog is internally inconsistent
    #[error("Invalid snapshot: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, DataLoadError>;
