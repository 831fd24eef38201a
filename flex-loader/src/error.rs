//! Error types for the loader crate.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to unpack an archive into a directory.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("archive source not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("archive entry escapes the target directory: {0}")]
    UnsafeEntry(String),

    #[error("archive has more than {limit} entries")]
    TooManyEntries { limit: usize },

    #[error("archive unpacks to more than {limit} bytes")]
    TooLarge { limit: u64 },
}

/// Failure of a load/unload lifecycle operation.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("extraction failed: {0}")]
    ExtractionFailed(#[source] ExtractionError),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("background task failed: {0}")]
    TaskFailed(String),
}

impl LoadError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failure to read a flex archive or write one.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("archive source error: {0}")]
    Source(#[from] ExtractionError),

    #[error("missing required entry: {0}")]
    MissingEntry(String),

    #[error("manifest error: {0}")]
    Schema(#[from] flex_meta::SchemaError),
}

/// Failure to read an explicit loader configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization error: {0}")]
    Toml(#[from] toml::de::Error),
}
