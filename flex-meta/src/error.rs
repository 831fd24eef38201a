//! Error types for manifest parsing and validation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid extension id '{0}': expected dot-separated identifier segments")]
    InvalidId(String),

    #[error("malformed author entry '{0}': expected `Name <email> (url)`")]
    MalformedAuthor(String),

    #[error("invalid config payload: {0}")]
    InvalidConfig(#[source] serde_json::Error),
}
