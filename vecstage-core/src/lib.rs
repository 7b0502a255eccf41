//! Shared types for staging precomputed embeddings into a vector index.

pub mod batch;
mod diff;
mod error;
mod in_memory;
mod index;
pub mod metadata;
mod record;

pub use diff::IdDiff;
pub use error::CoreError;
pub use in_memory::{MemoryControl, MemoryIndex};
pub use index::{IndexControl, IndexSpec, Metric, VectorIndex};
pub use record::{
    is_embedding_column, ResolvedEmbedding, StagedRecord, VectorRecord, EMBEDDING_SUFFIX,
    PAGE_CONTENT_EMBEDDING,
};

pub type Value = serde_json::Value;
