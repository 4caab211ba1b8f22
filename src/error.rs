//! Error taxonomy for the reading, ingestion, and history paths.
//!
//! Every document-level variant carries the path it was raised for, so a
//! caller orchestrating many uploads can report which file failed without
//! wrapping the error again.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("document not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("unsupported file format '{extension}': {}", path.display())]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("malformed document {}: {reason}", path.display())]
    MalformedDocument { path: PathBuf, reason: String },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to insert batch {batch} of {} into collection: {reason}", path.display())]
    Insertion {
        path: PathBuf,
        batch: usize,
        reason: String,
    },

    #[error("history file {} is unusable: {reason}", path.display())]
    Persistence { path: PathBuf, reason: String },

    #[error("generation failed: {0}")]
    Generation(String),

    #[error("semantic search failed: {0}")]
    Search(String),
}

impl Error {
    /// Maps an I/O error on `path` to `NotFound` or `Io`.
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound { path }
        } else {
            Error::Io { path, source }
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
