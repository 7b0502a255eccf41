use std::path::PathBuf;

use arrow_schema::ArrowError;
use parquet::errors::ParquetError;
use thiserror::Error;
use vecstage_core::CoreError;
use vecstage_pinecone::PineconeError;

#[derive(Debug, Error)]
pub enum StagingError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parquet error: {0}")]
    Parquet(#[from] ParquetError),
    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),
    #[error("staging file has no 'id' column")]
    MissingIdColumn,
    #[error("duplicate id '{0}' in staging file")]
    DuplicateId(String),
    #[error("null or empty id at row {row}")]
    NullId { row: usize },
    #[error("unsupported id value at row {row}: {value}")]
    UnsupportedId { row: usize, value: String },
    #[error("staging file {} contains no rows", .0.display())]
    EmptyFrame(PathBuf),
    #[error("index not bound: call initialize_index or connect_index first")]
    NotInitialized,
    #[error("invalid settings: {0}")]
    Settings(String),
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<PineconeError> for StagingError {
    fn from(value: PineconeError) -> Self {
        StagingError::Core(value.into())
    }
}
