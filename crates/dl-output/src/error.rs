//! Error types for dl-output.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while writing generator output.
#[derive(Debug, Error)]
pub enum OutputError {
    /// An output file could not be created.
    #[error("cannot create {}: {source}", path.display())]
    Create {
        path:   PathBuf,
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[cfg(feature = "parquet")]
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[cfg(feature = "parquet")]
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}

pub type OutputResult<T> = Result<T, OutputError>;

/// Create (or truncate) `path`, naming it in the error.
pub(crate) fn create_file(path: PathBuf) -> OutputResult<std::fs::File> {
    std::fs::File::create(&path).map_err(|source| OutputError::Create { path, source })
}
