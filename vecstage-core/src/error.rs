use std::error::Error as StdError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("dimension mismatch for '{id}': expected {expected}, got {got}")]
    DimensionMismatch {
        id: String,
        expected: usize,
        got: usize,
    },
    #[error("no embedding for '{id}' in '{column}' or fallback '{fallback}'")]
    MissingEmbedding {
        id: String,
        column: String,
        fallback: String,
    },
    #[error("malformed embedding in '{column}' for '{id}': {reason}")]
    MalformedEmbedding {
        id: String,
        column: String,
        reason: String,
    },
    #[error("index '{0}' does not exist")]
    IndexNotFound(String),
    #[error("invalid record id: {0:?}")]
    InvalidId(String),
    #[error("index error: {0}")]
    Index(#[source] Box<dyn StdError + Send + Sync>),
}
