//! Stage precomputed embeddings from a Parquet file into a vector index.
//!
//! The pipeline is three steps, each exposed on [`VectorStore`]:
//! 1. `initialize_index` ensures the remote index exists (`connect_index`
//!    binds to an existing one without creating it),
//! 2. `staging_to_vector_store` cleans metadata and upserts in batches,
//! 3. `validate_index` diffs staged ids against the ids the index reports.

mod error;
mod frame;
mod loader;
mod settings;
mod store;

pub use error::StagingError;
pub use frame::{clean_metadata_for_vector_store, MetadataRow, StagedFrame};
pub use loader::parquet_to_frame;
pub use settings::{Settings, SettingsOverrides};
pub use store::{RunReport, UploadSummary, VectorStore};
